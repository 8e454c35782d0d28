//! The full set of repositories a deployment runs on.

use crate::mysql::{
    MySqlAttendanceRepository, MySqlClassRepository, MySqlEnrollmentRepository, MySqlMealPlanRepository,
    MySqlMembershipRepository, MySqlPaymentRepository, MySqlTrainerRepository, MySqlUserRepository,
    MySqlWorkoutPlanRepository,
};
use crate::pool::DatabasePool;
use crate::traits::{
    AttendanceRepository, ClassRepository, EnrollmentRepository, HealthProbe, MealPlanRepository,
    MembershipRepository, PaymentRepository, TrainerRepository, UserRepository, WorkoutPlanRepository,
};
use std::sync::Arc;

/// Repository trait objects handed to the service layer.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub trainers: Arc<dyn TrainerRepository>,
    pub memberships: Arc<dyn MembershipRepository>,
    pub classes: Arc<dyn ClassRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub attendance: Arc<dyn AttendanceRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub workout_plans: Arc<dyn WorkoutPlanRepository>,
    pub meal_plans: Arc<dyn MealPlanRepository>,
    pub health: Arc<dyn HealthProbe>,
}

impl Repositories {
    /// MySQL repositories sharing one pool.
    #[must_use]
    pub fn mysql(pool: Arc<DatabasePool>) -> Self {
        Self {
            users: Arc::new(MySqlUserRepository::new(Arc::clone(&pool))),
            trainers: Arc::new(MySqlTrainerRepository::new(Arc::clone(&pool))),
            memberships: Arc::new(MySqlMembershipRepository::new(Arc::clone(&pool))),
            classes: Arc::new(MySqlClassRepository::new(Arc::clone(&pool))),
            enrollments: Arc::new(MySqlEnrollmentRepository::new(Arc::clone(&pool))),
            attendance: Arc::new(MySqlAttendanceRepository::new(Arc::clone(&pool))),
            payments: Arc::new(MySqlPaymentRepository::new(Arc::clone(&pool))),
            workout_plans: Arc::new(MySqlWorkoutPlanRepository::new(Arc::clone(&pool))),
            meal_plans: Arc::new(MySqlMealPlanRepository::new(Arc::clone(&pool))),
            health: pool,
        }
    }

    /// Every repository backed by the same in-memory store.
    #[cfg(any(test, feature = "memory"))]
    #[must_use]
    pub fn memory(store: Arc<crate::memory::MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            trainers: store.clone(),
            memberships: store.clone(),
            classes: store.clone(),
            enrollments: store.clone(),
            attendance: store.clone(),
            payments: store.clone(),
            workout_plans: store.clone(),
            meal_plans: store.clone(),
            health: store,
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}
