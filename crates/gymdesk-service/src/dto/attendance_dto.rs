//! Attendance DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use gymdesk_core::{Attendance, AttendanceId, AttendanceStatus, ClassId, EnrollmentId, UserId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Marks one member for one class on one day.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct MarkAttendanceRequest {
    pub class_id: ClassId,
    pub member_id: UserId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct BulkAttendanceRecord {
    pub member_id: UserId,
    pub status: AttendanceStatus,
}

/// Marks a whole class roll for one day.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct BulkAttendanceRequest {
    pub class_id: ClassId,
    pub date: NaiveDate,

    #[validate(length(min = 1, message = "At least one record is required"))]
    pub records: Vec<BulkAttendanceRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceResponse {
    pub id: AttendanceId,
    pub enrollment_id: EnrollmentId,
    pub class_id: ClassId,
    pub member_id: UserId,
    pub attendance_date: NaiveDate,
    pub status: AttendanceStatus,
    pub marked_by: UserId,
    pub marked_at: DateTime<Utc>,
}

impl From<Attendance> for AttendanceResponse {
    fn from(attendance: Attendance) -> Self {
        Self {
            id: attendance.id,
            enrollment_id: attendance.enrollment_id,
            class_id: attendance.class_id,
            member_id: attendance.member_id,
            attendance_date: attendance.attendance_date,
            status: attendance.status,
            marked_by: attendance.marked_by,
            marked_at: attendance.marked_at,
        }
    }
}

/// A stored mark and whether it was new.
#[derive(Debug, Clone)]
pub struct MarkedAttendance {
    pub created: bool,
    pub attendance: AttendanceResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BulkMarkOutcome {
    Recorded,
    Updated,
    EnrollmentNotFound,
    DateOutOfRange,
    /// The store rejected the write; other records are unaffected.
    Failed,
}

/// Outcome for one record of a bulk request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkAttendanceResult {
    pub member_id: UserId,
    pub outcome: BulkMarkOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkAttendanceResponse {
    pub recorded: usize,
    pub updated: usize,
    pub failed: usize,
    pub results: Vec<BulkAttendanceResult>,
}

impl BulkAttendanceResponse {
    #[must_use]
    pub fn from_results(results: Vec<BulkAttendanceResult>) -> Self {
        let count = |outcome| results.iter().filter(|r| r.outcome == outcome).count();
        let recorded = count(BulkMarkOutcome::Recorded);
        let updated = count(BulkMarkOutcome::Updated);
        Self {
            recorded,
            updated,
            failed: results.len() - recorded - updated,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_request_requires_records() {
        let request = BulkAttendanceRequest {
            class_id: ClassId::new(),
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            records: Vec::new(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_bulk_response_counts() {
        let result = |outcome| BulkAttendanceResult {
            member_id: UserId::new(),
            outcome,
            message: None,
        };
        let response = BulkAttendanceResponse::from_results(vec![
            result(BulkMarkOutcome::Recorded),
            result(BulkMarkOutcome::Recorded),
            result(BulkMarkOutcome::Updated),
            result(BulkMarkOutcome::EnrollmentNotFound),
        ]);
        assert_eq!(response.recorded, 2);
        assert_eq!(response.updated, 1);
        assert_eq!(response.failed, 1);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["results"][3]["outcome"], "enrollment_not_found");
    }
}
