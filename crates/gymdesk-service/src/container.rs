//! Wiring of every service over one set of repositories.

use crate::{
    AttendanceService, AttendanceServiceImpl, AuthService, AuthServiceImpl, ClassService, ClassServiceImpl,
    DashboardService, DashboardServiceImpl, EnrollmentService, EnrollmentServiceImpl, MealPlanService,
    MealPlanServiceImpl, MembershipService, MembershipServiceImpl, PaymentService, PaymentServiceImpl,
    TrainerService, TrainerServiceImpl, UserService, UserServiceImpl, WorkoutPlanService, WorkoutPlanServiceImpl,
};
use gymdesk_config::{GymConfig, SecurityConfig};
use gymdesk_core::Clock;
use gymdesk_repository::{HealthProbe, Repositories};
use gymdesk_security::{PasswordHasher, TokenProvider};
use std::sync::Arc;

/// All application services, shared by the HTTP layer.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserService>,
    pub trainers: Arc<dyn TrainerService>,
    pub memberships: Arc<dyn MembershipService>,
    pub classes: Arc<dyn ClassService>,
    pub enrollments: Arc<dyn EnrollmentService>,
    pub attendance: Arc<dyn AttendanceService>,
    pub payments: Arc<dyn PaymentService>,
    pub workout_plans: Arc<dyn WorkoutPlanService>,
    pub meal_plans: Arc<dyn MealPlanService>,
    pub dashboard: Arc<dyn DashboardService>,
    /// Verifies bearer tokens in the auth middleware.
    pub tokens: Arc<TokenProvider>,
    /// Backs the readiness endpoint.
    pub health: Arc<dyn HealthProbe>,
}

impl Services {
    pub fn new(repos: &Repositories, security: Arc<SecurityConfig>, gym: GymConfig, clock: Arc<dyn Clock>) -> Self {
        let hasher = Arc::new(PasswordHasher::from_config(&security));
        let tokens = Arc::new(TokenProvider::new(security));

        Self {
            auth: Arc::new(AuthServiceImpl::new(
                Arc::clone(&repos.users),
                Arc::clone(&hasher),
                Arc::clone(&tokens),
                Arc::clone(&clock),
            )),
            users: Arc::new(UserServiceImpl::new(
                Arc::clone(&repos.users),
                Arc::clone(&repos.trainers),
                Arc::clone(&hasher),
            )),
            trainers: Arc::new(TrainerServiceImpl::new(
                Arc::clone(&repos.trainers),
                Arc::clone(&repos.users),
                hasher,
            )),
            memberships: Arc::new(MembershipServiceImpl::new(
                Arc::clone(&repos.memberships),
                Arc::clone(&repos.users),
                Arc::clone(&clock),
            )),
            classes: Arc::new(ClassServiceImpl::new(
                Arc::clone(&repos.classes),
                Arc::clone(&repos.trainers),
            )),
            enrollments: Arc::new(EnrollmentServiceImpl::new(
                Arc::clone(&repos.enrollments),
                Arc::clone(&repos.classes),
                gym.clone(),
                Arc::clone(&clock),
            )),
            attendance: Arc::new(AttendanceServiceImpl::new(
                Arc::clone(&repos.attendance),
                Arc::clone(&repos.classes),
                gym,
                Arc::clone(&clock),
            )),
            payments: Arc::new(PaymentServiceImpl::new(
                Arc::clone(&repos.payments),
                Arc::clone(&repos.users),
                Arc::clone(&clock),
            )),
            workout_plans: Arc::new(WorkoutPlanServiceImpl::new(
                Arc::clone(&repos.workout_plans),
                Arc::clone(&repos.users),
                Arc::clone(&repos.trainers),
                Arc::clone(&clock),
            )),
            meal_plans: Arc::new(MealPlanServiceImpl::new(
                Arc::clone(&repos.meal_plans),
                Arc::clone(&repos.users),
                Arc::clone(&repos.trainers),
                Arc::clone(&clock),
            )),
            dashboard: Arc::new(DashboardServiceImpl::new(
                Arc::clone(&repos.users),
                Arc::clone(&repos.trainers),
                Arc::clone(&repos.memberships),
                Arc::clone(&repos.classes),
                Arc::clone(&repos.payments),
                clock,
            )),
            tokens,
            health: Arc::clone(&repos.health),
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
