//! Class enrollment.

use super::super::value_objects::EnrollmentStatus;
use crate::{ClassId, EnrollmentId, Entity, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Join row linking a member to a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub class_id: ClassId,
    pub member_id: UserId,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
}

impl Enrollment {
    #[must_use]
    pub fn new(class_id: ClassId, member_id: UserId) -> Self {
        Self {
            id: EnrollmentId::new(),
            class_id,
            member_id,
            status: EnrollmentStatus::Enrolled,
            enrolled_at: Utc::now(),
        }
    }
}

impl Entity<EnrollmentId> for Enrollment {
    fn id(&self) -> &EnrollmentId {
        &self.id
    }
}

/// Result of an enrollment attempt.
///
/// The repository decides these inside one transaction, counting seats under
/// a row lock on the class so two concurrent requests cannot both take the
/// last spot.
#[derive(Debug, Clone)]
pub enum EnrollmentOutcome {
    Enrolled(Enrollment),
    ClassNotFound,
    /// The target user does not exist or is not a member.
    NotAMember,
    /// Enrollment requires an active membership and the member has none.
    MembershipInactive,
    AlreadyEnrolled,
    ClassFull { capacity: u32 },
}
