//! Scheduled class.

use crate::{ClassId, Entity, GymdeskError, GymdeskResult, TrainerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scheduled group session run by one trainer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GymClass {
    pub id: ClassId,
    pub name: String,
    pub description: Option<String>,
    pub trainer_id: TrainerId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: u32,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GymClass {
    /// Largest class the studio supports.
    pub const MAX_CAPACITY: u32 = 500;

    /// Creates a class after checking its schedule and capacity.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty or inverted time window or a
    /// capacity outside `1..=MAX_CAPACITY`.
    pub fn new(
        name: String,
        trainer_id: TrainerId,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        capacity: u32,
    ) -> GymdeskResult<Self> {
        Self::check_window(starts_at, ends_at)?;
        Self::check_capacity(capacity)?;
        let now = Utc::now();
        Ok(Self {
            id: ClassId::new(),
            name,
            description: None,
            trainer_id,
            starts_at,
            ends_at,
            capacity,
            location: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn check_window(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> GymdeskResult<()> {
        if ends_at <= starts_at {
            return Err(GymdeskError::validation("class must end after it starts"));
        }
        Ok(())
    }

    pub fn check_capacity(capacity: u32) -> GymdeskResult<()> {
        if capacity == 0 || capacity > Self::MAX_CAPACITY {
            return Err(GymdeskError::validation(format!(
                "capacity must be between 1 and {}",
                Self::MAX_CAPACITY
            )));
        }
        Ok(())
    }

    /// Half-open interval overlap: a class ending at 10:00 does not clash
    /// with one starting at 10:00.
    #[must_use]
    pub fn overlaps(&self, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> bool {
        self.starts_at < ends_at && starts_at < self.ends_at
    }

    #[must_use]
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Entity<ClassId> for GymClass {
    fn id(&self) -> &ClassId {
        &self.id
    }
}

/// Result of a guarded class update. The store re-reads the enrolled count
/// and the trainer's schedule while holding the class row lock.
#[derive(Debug, Clone)]
pub enum ClassUpdateOutcome {
    Updated { class: GymClass, enrolled: u64 },
    NotFound,
    CapacityBelowEnrolled { enrolled: u64 },
    TrainerBusy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    fn class(start: u32, end: u32) -> GymClass {
        GymClass::new("Spin".to_string(), TrainerId::new(), at(start), at(end), 20).unwrap()
    }

    #[test]
    fn test_rejects_inverted_window() {
        assert!(GymClass::new("Yoga".to_string(), TrainerId::new(), at(10), at(9), 10).is_err());
        assert!(GymClass::new("Yoga".to_string(), TrainerId::new(), at(10), at(10), 10).is_err());
    }

    #[test]
    fn test_rejects_bad_capacity() {
        assert!(GymClass::new("Yoga".to_string(), TrainerId::new(), at(9), at(10), 0).is_err());
        assert!(GymClass::new("Yoga".to_string(), TrainerId::new(), at(9), at(10), 501).is_err());
    }

    #[test]
    fn test_overlap_is_half_open() {
        let c = class(9, 10);
        assert!(c.overlaps(at(9), at(10)));
        assert!(c.overlaps(at(8), at(11)));
        assert!(c.overlaps(at(9) + Duration::minutes(30), at(11)));
        assert!(!c.overlaps(at(10), at(11)));
        assert!(!c.overlaps(at(7), at(9)));
    }
}
