//! Class and enrollment DTOs.

use chrono::{DateTime, Utc};
use gymdesk_core::rules::not_blank;
use gymdesk_core::{ClassId, Enrollment, EnrollmentId, EnrollmentStatus, GymClass, TrainerId, UserId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Schedules a class.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateClassRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "not_blank")
    )]
    pub name: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    pub trainer_id: TrainerId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,

    #[validate(range(min = 1, max = 500, message = "Capacity must be between 1 and 500"))]
    pub capacity: u32,

    #[validate(length(max = 100))]
    pub location: Option<String>,
}

/// Partial update of a class. Only admins may reassign the trainer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateClassRequest {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub name: Option<String>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    pub trainer_id: Option<TrainerId>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,

    #[validate(range(min = 1, max = 500, message = "Capacity must be between 1 and 500"))]
    pub capacity: Option<u32>,

    #[validate(length(max = 100))]
    pub location: Option<String>,
}

/// Class with its current occupancy.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassResponse {
    pub id: ClassId,
    pub name: String,
    pub description: Option<String>,
    pub trainer_id: TrainerId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: u32,
    pub location: Option<String>,
    pub enrolled_count: u64,
    pub remaining_spots: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClassResponse {
    #[must_use]
    pub fn with_enrolled(class: GymClass, enrolled_count: u64) -> Self {
        Self {
            remaining_spots: u64::from(class.capacity).saturating_sub(enrolled_count),
            enrolled_count,
            id: class.id,
            name: class.name,
            description: class.description,
            trainer_id: class.trainer_id,
            starts_at: class.starts_at,
            ends_at: class.ends_at,
            capacity: class.capacity,
            location: class.location,
            created_at: class.created_at,
            updated_at: class.updated_at,
        }
    }
}

/// Enrollment request. Members always enroll themselves; staff name the member.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct EnrollRequest {
    pub member_id: Option<UserId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnrollmentResponse {
    pub id: EnrollmentId,
    pub class_id: ClassId,
    pub member_id: UserId,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
}

impl From<Enrollment> for EnrollmentResponse {
    fn from(enrollment: Enrollment) -> Self {
        Self {
            id: enrollment.id,
            class_id: enrollment.class_id,
            member_id: enrollment.member_id,
            status: enrollment.status,
            enrolled_at: enrollment.enrolled_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_create_class_request_capacity_bounds() {
        let starts_at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let mut request = CreateClassRequest {
            name: "Spin".to_string(),
            description: None,
            trainer_id: TrainerId::new(),
            starts_at,
            ends_at: starts_at + Duration::hours(1),
            capacity: 20,
            location: Some("Studio 2".to_string()),
        };
        assert!(request.validate().is_ok());

        request.capacity = 501;
        assert!(request.validate().is_err());
        request.capacity = 0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_remaining_spots_never_negative() {
        let starts_at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let class = GymClass::new("Yoga".to_string(), TrainerId::new(), starts_at, starts_at + Duration::hours(1), 2)
            .unwrap();
        let response = ClassResponse::with_enrolled(class, 3);
        assert_eq!(response.remaining_spots, 0);
    }
}
