//! In-memory repositories.
//!
//! [`MemoryStore`] keeps every table behind one lock, so each trait method
//! is atomic the same way the MySQL transactions are. Uniqueness rules the
//! schema enforces (user email, one enrollment per member and class, one
//! attendance mark per enrollment and date) are checked here as well.

mod classes;
mod payments;
mod users;

use crate::traits::HealthProbe;
use async_trait::async_trait;
use gymdesk_core::{
    Attendance, ClassId, Enrollment, EnrollmentId, EnrollmentStatus, GymClass, GymdeskError, GymdeskResult, MealPlan,
    MealPlanId, Membership, Page, PageRequest, Payment, Trainer, TrainerId, User, UserId, WorkoutPlan, WorkoutPlanId,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    trainers: HashMap<TrainerId, Trainer>,
    /// Keyed by user; a user has at most one membership.
    memberships: HashMap<UserId, Membership>,
    classes: HashMap<ClassId, GymClass>,
    enrollments: Vec<Enrollment>,
    attendance: Vec<Attendance>,
    payments: Vec<Payment>,
    workout_plans: HashMap<WorkoutPlanId, WorkoutPlan>,
    meal_plans: HashMap<MealPlanId, MealPlan>,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.email.as_str().eq_ignore_ascii_case(email))
    }

    fn insert_user(&mut self, user: &User) -> GymdeskResult<()> {
        if self.email_taken(user.email.as_str(), None) {
            return Err(GymdeskError::conflict(format!("Duplicate entry '{}' for key 'users.email'", user.email)));
        }
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    fn enrolled_count(&self, class_id: ClassId) -> u64 {
        self.enrollments
            .iter()
            .filter(|e| e.class_id == class_id && e.status == EnrollmentStatus::Enrolled)
            .count() as u64
    }

    /// Drops the attendance rows of the given enrollments.
    fn drop_attendance_of(&mut self, enrollment_ids: &[EnrollmentId]) {
        self.attendance.retain(|a| !enrollment_ids.contains(&a.enrollment_id));
    }
}

/// In-memory implementation of every repository trait.
#[derive(Debug)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    healthy: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            healthy: AtomicBool::new(true),
        }
    }

    /// Makes [`HealthProbe::health_check`] fail until set back.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HealthProbe for MemoryStore {
    async fn health_check(&self) -> GymdeskResult<()> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(GymdeskError::Unavailable("memory store marked unhealthy".to_string()))
        }
    }
}

/// Pages an already filtered and ordered list.
fn paginate<T: Clone>(items: &[T], page: PageRequest) -> Page<T> {
    Page::new(page.slice(items), page, items.len() as u64)
}

/// Case-insensitive substring match on any of `fields`; an empty needle matches.
fn matches_search(search: Option<&str>, fields: &[&str]) -> bool {
    match search.map(str::trim).filter(|s| !s.is_empty()) {
        None => true,
        Some(needle) => {
            let needle = needle.to_lowercase();
            fields.iter().any(|f| f.to_lowercase().contains(&needle))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_search() {
        assert!(matches_search(None, &["Ana"]));
        assert!(matches_search(Some("  "), &["Ana"]));
        assert!(matches_search(Some("an"), &["Bob", "ANA"]));
        assert!(!matches_search(Some("zed"), &["Bob", "Ana"]));
    }

    #[tokio::test]
    async fn test_health_toggle() {
        let store = MemoryStore::new();
        assert!(store.health_check().await.is_ok());
        store.set_healthy(false);
        let err = store.health_check().await.unwrap_err();
        assert_eq!(err.status_code(), 503);
    }
}
