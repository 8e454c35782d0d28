//! Repository trait definitions.
//!
//! Operations that must touch several tables atomically (registration,
//! enrollment, attendance marking, payment processing and the cascading
//! deletes) are single trait methods so each implementation can run them in
//! one transaction.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use gymdesk_core::{
    AttendanceOutcome, AttendanceStatus, AttendanceSummary, AttendanceWindow, Attendance, ClassId, ClassUpdateOutcome,
    Enrollment,
    EnrollmentOutcome, GymClass, GymdeskResult, MealPlan, MealPlanId, Membership, MembershipStatus, MembershipType,
    Page, PageRequest, Payment, PaymentId, PaymentStatus, ProcessedPayment, TrainerId, TrainerProfile, User, UserId,
    UserRole, WorkoutPlan, WorkoutPlanId,
};

/// Filters for listing users.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    /// Case-insensitive match on first name, last name or email.
    pub search: Option<String>,
}

/// Filters for listing classes.
#[derive(Debug, Clone, Default)]
pub struct ClassFilter {
    pub trainer_id: Option<TrainerId>,
    pub search: Option<String>,
    /// Classes starting at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Classes starting before this instant.
    pub to: Option<DateTime<Utc>>,
}

/// Filters for listing payments.
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub member_id: Option<UserId>,
    pub status: Option<PaymentStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Filters for listing workout and meal plans.
#[derive(Debug, Clone, Default)]
pub struct PlanFilter {
    pub member_id: Option<UserId>,
    pub trainer_id: Option<TrainerId>,
}

/// One attendance mark to record.
#[derive(Debug, Clone)]
pub struct MarkAttendance {
    pub class_id: ClassId,
    pub member_id: UserId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub marked_by: UserId,
    pub window: AttendanceWindow,
}

/// Membership period bought together with a payment.
#[derive(Debug, Clone, Copy)]
pub struct MembershipRenewal {
    pub membership_type: MembershipType,
    pub today: NaiveDate,
}

/// Readiness probe for the backing store.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Checks if the store answers queries.
    async fn health_check(&self) -> GymdeskResult<()>;
}

/// User repository trait.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by ID.
    async fn find_by_id(&self, id: UserId) -> GymdeskResult<Option<User>>;

    /// Finds a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> GymdeskResult<Option<User>>;

    /// Checks if an email is already registered.
    async fn exists_by_email(&self, email: &str) -> GymdeskResult<bool>;

    /// Lists users, newest first.
    async fn find_all(&self, filter: &UserFilter, page: PageRequest) -> GymdeskResult<Page<User>>;

    /// Saves a new user.
    async fn save(&self, user: &User) -> GymdeskResult<User>;

    /// Saves a new user and, optionally, their first membership in one transaction.
    async fn register(&self, user: &User, membership: Option<&Membership>) -> GymdeskResult<User>;

    /// Updates an existing user.
    async fn update(&self, user: &User) -> GymdeskResult<User>;

    /// Deletes a user that has no trainer profile, together with their
    /// attendance, enrollments, payments, plans and membership.
    async fn delete(&self, id: UserId) -> GymdeskResult<bool>;

    /// Counts users by role.
    async fn count_by_role(&self, role: UserRole) -> GymdeskResult<u64>;
}

/// Trainer repository trait.
#[async_trait]
pub trait TrainerRepository: Send + Sync {
    async fn find_by_id(&self, id: TrainerId) -> GymdeskResult<Option<TrainerProfile>>;

    async fn find_by_user_id(&self, user_id: UserId) -> GymdeskResult<Option<TrainerProfile>>;

    /// Lists trainers ordered by last name.
    async fn find_all(&self, search: Option<&str>, page: PageRequest) -> GymdeskResult<Page<TrainerProfile>>;

    /// Inserts the trainer user and profile in one transaction.
    async fn create(&self, profile: &TrainerProfile) -> GymdeskResult<TrainerProfile>;

    /// Updates the trainer user and profile in one transaction.
    async fn update(&self, profile: &TrainerProfile) -> GymdeskResult<TrainerProfile>;

    /// Deletes a trainer in dependency order: attendance, enrollments and
    /// classes of the trainer, then detaches authored plans, then removes
    /// the profile and the user.
    async fn delete(&self, id: TrainerId) -> GymdeskResult<bool>;

    async fn count(&self) -> GymdeskResult<u64>;
}

/// Membership repository trait.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn find_by_user(&self, user_id: UserId) -> GymdeskResult<Option<Membership>>;

    /// Lists memberships by effective status as of `today`.
    async fn find_all(
        &self,
        status: Option<MembershipStatus>,
        today: NaiveDate,
        page: PageRequest,
    ) -> GymdeskResult<Page<Membership>>;

    async fn save(&self, membership: &Membership) -> GymdeskResult<Membership>;

    async fn update(&self, membership: &Membership) -> GymdeskResult<Membership>;

    /// Extends the member's membership by `periods` in one transaction,
    /// holding the row lock between read and write. `None` keeps the
    /// current type. Returns `None` when the member has no membership.
    async fn renew(
        &self,
        user_id: UserId,
        membership_type: Option<MembershipType>,
        periods: u32,
        today: NaiveDate,
    ) -> GymdeskResult<Option<Membership>>;

    /// Marks every active membership that expired before `today`. Returns the count.
    async fn expire_overdue(&self, today: NaiveDate) -> GymdeskResult<u64>;

    /// Counts memberships by effective status as of `today`.
    async fn count_by_status(&self, status: MembershipStatus, today: NaiveDate) -> GymdeskResult<u64>;
}

/// Class repository trait.
#[async_trait]
pub trait ClassRepository: Send + Sync {
    async fn find_by_id(&self, id: ClassId) -> GymdeskResult<Option<GymClass>>;

    /// Lists classes ordered by start time.
    async fn find_all(&self, filter: &ClassFilter, page: PageRequest) -> GymdeskResult<Page<GymClass>>;

    /// Checks whether the trainer already holds a class overlapping
    /// `[starts_at, ends_at)`, ignoring `exclude`.
    async fn has_overlap(
        &self,
        trainer_id: TrainerId,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        exclude: Option<ClassId>,
    ) -> GymdeskResult<bool>;

    async fn save(&self, class: &GymClass) -> GymdeskResult<GymClass>;

    /// Writes the class in one transaction after re-checking, under the
    /// class row lock, that capacity still covers the enrolled members and
    /// that the trainer is free for the new window.
    async fn update(&self, class: &GymClass) -> GymdeskResult<ClassUpdateOutcome>;

    /// Deletes the class with its enrollments and their attendance.
    async fn delete(&self, id: ClassId) -> GymdeskResult<bool>;

    /// Number of active enrollments in the class.
    async fn enrolled_count(&self, id: ClassId) -> GymdeskResult<u64>;

    async fn count(&self) -> GymdeskResult<u64>;

    /// Classes starting at or after `now`.
    async fn count_upcoming(&self, now: DateTime<Utc>) -> GymdeskResult<u64>;
}

/// Enrollment repository trait.
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Enrolls a member in one transaction, checking in order: class exists,
    /// target is a member, membership active on `membership_required_on`
    /// (when given), not already enrolled, a seat is free.
    async fn enroll(
        &self,
        class_id: ClassId,
        member_id: UserId,
        membership_required_on: Option<NaiveDate>,
    ) -> GymdeskResult<EnrollmentOutcome>;

    /// Removes an enrollment and its attendance rows.
    async fn unenroll(&self, class_id: ClassId, member_id: UserId) -> GymdeskResult<bool>;

    async fn find(&self, class_id: ClassId, member_id: UserId) -> GymdeskResult<Option<Enrollment>>;

    async fn find_by_class(&self, class_id: ClassId, page: PageRequest) -> GymdeskResult<Page<Enrollment>>;

    async fn find_by_member(&self, member_id: UserId, page: PageRequest) -> GymdeskResult<Page<Enrollment>>;
}

/// Attendance repository trait.
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Records or overwrites one mark in a transaction.
    async fn mark(&self, request: &MarkAttendance) -> GymdeskResult<AttendanceOutcome>;

    async fn find_by_class_and_date(&self, class_id: ClassId, date: NaiveDate) -> GymdeskResult<Vec<Attendance>>;

    /// Lists a member's marks, newest date first.
    async fn find_by_member(
        &self,
        member_id: UserId,
        class_id: Option<ClassId>,
        page: PageRequest,
    ) -> GymdeskResult<Page<Attendance>>;

    async fn summary(&self, member_id: UserId, class_id: Option<ClassId>) -> GymdeskResult<AttendanceSummary>;
}

/// Payment repository trait.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Inserts the payment and renews (or starts) the member's membership
    /// in one transaction.
    async fn process(&self, payment: &Payment, renewal: Option<MembershipRenewal>) -> GymdeskResult<ProcessedPayment>;

    async fn find_by_id(&self, id: PaymentId) -> GymdeskResult<Option<Payment>>;

    /// Lists payments, newest first.
    async fn find_all(&self, filter: &PaymentFilter, page: PageRequest) -> GymdeskResult<Page<Payment>>;

    async fn update(&self, payment: &Payment) -> GymdeskResult<Payment>;

    /// Sum of completed payments with `paid_at` in `[from, to)`.
    async fn revenue_cents(&self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> GymdeskResult<i64>;
}

/// Workout plan repository trait.
#[async_trait]
pub trait WorkoutPlanRepository: Send + Sync {
    async fn find_by_id(&self, id: WorkoutPlanId) -> GymdeskResult<Option<WorkoutPlan>>;

    async fn find_all(&self, filter: &PlanFilter, page: PageRequest) -> GymdeskResult<Page<WorkoutPlan>>;

    async fn save(&self, plan: &WorkoutPlan) -> GymdeskResult<WorkoutPlan>;

    async fn update(&self, plan: &WorkoutPlan) -> GymdeskResult<WorkoutPlan>;

    async fn delete(&self, id: WorkoutPlanId) -> GymdeskResult<bool>;
}

/// Meal plan repository trait.
#[async_trait]
pub trait MealPlanRepository: Send + Sync {
    async fn find_by_id(&self, id: MealPlanId) -> GymdeskResult<Option<MealPlan>>;

    async fn find_all(&self, filter: &PlanFilter, page: PageRequest) -> GymdeskResult<Page<MealPlan>>;

    async fn save(&self, plan: &MealPlan) -> GymdeskResult<MealPlan>;

    async fn update(&self, plan: &MealPlan) -> GymdeskResult<MealPlan>;

    async fn delete(&self, id: MealPlanId) -> GymdeskResult<bool>;
}
