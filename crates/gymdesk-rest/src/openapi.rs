//! OpenAPI documentation configuration.

use crate::controllers::{
    attendance_controller, auth_controller, class_controller, dashboard_controller, enrollment_controller,
    health_controller, meal_plan_controller, member_controller, membership_controller, payment_controller,
    trainer_controller, user_controller, workout_plan_controller,
};
use gymdesk_core::{
    AttendanceStatus, AttendanceSummary, Difficulty, EnrollmentStatus, ErrorResponse, Exercise, FieldError, Meal,
    MembershipStatus, MembershipType, PageInfo, PaymentMethod, PaymentStatus, UserRole, UserStatus,
};
use gymdesk_service::{
    AttendanceResponse, AuthResponse, BulkAttendanceRecord, BulkAttendanceRequest, BulkAttendanceResponse,
    BulkAttendanceResult, BulkMarkOutcome, ChangePasswordRequest, ClassResponse, CreateClassRequest,
    CreateMealPlanRequest, CreateMembershipRequest, CreateTrainerRequest, CreateUserRequest,
    CreateWorkoutPlanRequest, DashboardStats, EnrollRequest, EnrollmentResponse, ExpireMembershipsResponse,
    LoginRequest, MarkAttendanceRequest, MealPlanResponse, MembershipResponse, PaymentResponse,
    ProcessPaymentRequest, ProcessPaymentResponse, RefreshTokenRequest, RegisterRequest, RenewMembershipRequest,
    TrainerResponse, UpdateClassRequest, UpdateMealPlanRequest, UpdateMembershipRequest,
    UpdatePaymentStatusRequest, UpdateTrainerRequest, UpdateUserRequest, UpdateWorkoutPlanRequest, UserResponse,
    WorkoutPlanResponse,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI documentation for the Gymdesk API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gymdesk API",
        version = "1.0.0",
        description = "Gym management: members, trainers, memberships, classes, attendance, payments and plans",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        auth_controller::register,
        auth_controller::login,
        auth_controller::refresh_token,
        auth_controller::get_current_user,
        auth_controller::change_password,
        user_controller::list_users,
        user_controller::create_user,
        user_controller::get_user,
        user_controller::update_user,
        user_controller::delete_user,
        trainer_controller::list_trainers,
        trainer_controller::create_trainer,
        trainer_controller::get_trainer,
        trainer_controller::update_trainer,
        trainer_controller::delete_trainer,
        trainer_controller::list_trainer_classes,
        membership_controller::list_memberships,
        membership_controller::create_membership,
        membership_controller::get_membership,
        membership_controller::update_membership,
        membership_controller::renew_membership,
        membership_controller::expire_memberships,
        class_controller::list_classes,
        class_controller::create_class,
        class_controller::get_class,
        class_controller::update_class,
        class_controller::delete_class,
        enrollment_controller::enroll,
        enrollment_controller::unenroll,
        enrollment_controller::list_class_enrollments,
        attendance_controller::mark_attendance,
        attendance_controller::mark_bulk_attendance,
        attendance_controller::class_attendance,
        member_controller::member_enrollments,
        member_controller::member_attendance,
        member_controller::member_attendance_summary,
        member_controller::member_payments,
        payment_controller::process_payment,
        payment_controller::list_payments,
        payment_controller::get_payment,
        payment_controller::update_payment_status,
        workout_plan_controller::create_workout_plan,
        workout_plan_controller::list_workout_plans,
        workout_plan_controller::get_workout_plan,
        workout_plan_controller::update_workout_plan,
        workout_plan_controller::delete_workout_plan,
        meal_plan_controller::create_meal_plan,
        meal_plan_controller::list_meal_plans,
        meal_plan_controller::get_meal_plan,
        meal_plan_controller::update_meal_plan,
        meal_plan_controller::delete_meal_plan,
        dashboard_controller::dashboard_stats,
        health_controller::health_check,
        health_controller::readiness_check,
        health_controller::liveness_check,
    ),
    components(
        schemas(
            // Core types
            UserRole,
            UserStatus,
            MembershipType,
            MembershipStatus,
            EnrollmentStatus,
            AttendanceStatus,
            PaymentMethod,
            PaymentStatus,
            Difficulty,
            Exercise,
            Meal,
            AttendanceSummary,
            PageInfo,
            ErrorResponse,
            FieldError,
            // Auth
            RegisterRequest,
            LoginRequest,
            RefreshTokenRequest,
            ChangePasswordRequest,
            AuthResponse,
            // Users and trainers
            CreateUserRequest,
            UpdateUserRequest,
            UserResponse,
            CreateTrainerRequest,
            UpdateTrainerRequest,
            TrainerResponse,
            // Memberships
            CreateMembershipRequest,
            UpdateMembershipRequest,
            RenewMembershipRequest,
            MembershipResponse,
            ExpireMembershipsResponse,
            // Classes, enrollment, attendance
            CreateClassRequest,
            UpdateClassRequest,
            ClassResponse,
            EnrollRequest,
            EnrollmentResponse,
            MarkAttendanceRequest,
            BulkAttendanceRecord,
            BulkAttendanceRequest,
            BulkAttendanceResult,
            BulkAttendanceResponse,
            BulkMarkOutcome,
            AttendanceResponse,
            // Payments
            ProcessPaymentRequest,
            ProcessPaymentResponse,
            UpdatePaymentStatusRequest,
            PaymentResponse,
            // Plans
            CreateWorkoutPlanRequest,
            UpdateWorkoutPlanRequest,
            WorkoutPlanResponse,
            CreateMealPlanRequest,
            UpdateMealPlanRequest,
            MealPlanResponse,
            DashboardStats,
            health_controller::HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and tokens"),
        (name = "users", description = "User management"),
        (name = "trainers", description = "Trainer profiles"),
        (name = "memberships", description = "Membership lifecycle"),
        (name = "classes", description = "Class scheduling"),
        (name = "enrollments", description = "Class enrollment"),
        (name = "attendance", description = "Attendance marking"),
        (name = "members", description = "Per-member history"),
        (name = "payments", description = "Payments"),
        (name = "plans", description = "Workout and meal plans"),
        (name = "dashboard", description = "Admin dashboard"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

/// Security addon for JWT Bearer authentication.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token authentication"))
                        .build(),
                ),
            );
        }
    }
}
