//! Trainer profile.

use super::user::User;
use crate::{Entity, TrainerId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Professional details of a user with the `trainer` role.
///
/// Exactly one profile exists per trainer user; both rows are written in the
/// same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trainer {
    pub id: TrainerId,
    pub user_id: UserId,
    pub specialization: String,
    pub experience_years: u32,
    pub certification: Option<String>,
    pub bio: Option<String>,
    pub hourly_rate_cents: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trainer {
    #[must_use]
    pub fn new(user_id: UserId, specialization: String, experience_years: u32) -> Self {
        let now = Utc::now();
        Self {
            id: TrainerId::new(),
            user_id,
            specialization,
            experience_years,
            certification: None,
            bio: None,
            hourly_rate_cents: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Entity<TrainerId> for Trainer {
    fn id(&self) -> &TrainerId {
        &self.id
    }
}

/// A trainer profile together with its user row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerProfile {
    pub trainer: Trainer,
    pub user: User,
}
