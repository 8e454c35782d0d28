//! Attendance marks and summaries.

use super::super::value_objects::AttendanceStatus;
use super::enrollment::Enrollment;
use crate::{AttendanceId, ClassId, EnrollmentId, Entity, UserId};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Presence marker for one enrollment on one date.
///
/// `class_id` and `member_id` are read through the enrollment; only
/// `enrollment_id` is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendance {
    pub id: AttendanceId,
    pub enrollment_id: EnrollmentId,
    pub class_id: ClassId,
    pub member_id: UserId,
    pub attendance_date: NaiveDate,
    pub status: AttendanceStatus,
    pub marked_by: UserId,
    pub marked_at: DateTime<Utc>,
}

impl Attendance {
    #[must_use]
    pub fn new(
        enrollment: &Enrollment,
        attendance_date: NaiveDate,
        status: AttendanceStatus,
        marked_by: UserId,
    ) -> Self {
        Self {
            id: AttendanceId::new(),
            enrollment_id: enrollment.id,
            class_id: enrollment.class_id,
            member_id: enrollment.member_id,
            attendance_date,
            status,
            marked_by,
            marked_at: Utc::now(),
        }
    }

    /// Overwrites the status of an existing mark.
    pub fn remark(&mut self, status: AttendanceStatus, marked_by: UserId) {
        self.status = status;
        self.marked_by = marked_by;
        self.marked_at = Utc::now();
    }
}

impl Entity<AttendanceId> for Attendance {
    fn id(&self) -> &AttendanceId {
        &self.id
    }
}

/// What happened when an attendance mark was written.
#[derive(Debug, Clone)]
pub enum AttendanceOutcome {
    /// First mark for that enrollment and date.
    Recorded(Attendance),
    /// An earlier mark for the same date was overwritten.
    Updated(Attendance),
    /// The member is not enrolled in the class.
    EnrollmentNotFound,
    /// The date is in the future, too old, or before the class started.
    DateOutOfRange(String),
}

/// Dates on which attendance may be marked, relative to one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceWindow {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

impl AttendanceWindow {
    /// From `today - backdate_days` up to and including `today`.
    #[must_use]
    pub fn ending_on(today: NaiveDate, backdate_days: u32) -> Self {
        Self {
            earliest: today - Duration::days(i64::from(backdate_days)),
            latest: today,
        }
    }

    /// Checks `date` against the window and the class start date.
    ///
    /// # Errors
    ///
    /// Returns the reason the date is rejected.
    pub fn check(&self, date: NaiveDate, class_starts_on: NaiveDate) -> Result<(), String> {
        if date > self.latest {
            return Err("attendance cannot be marked for a future date".to_string());
        }
        if date < self.earliest {
            return Err(format!("attendance cannot be marked before {}", self.earliest));
        }
        if date < class_starts_on {
            return Err(format!("class does not start until {class_starts_on}"));
        }
        Ok(())
    }
}

/// Attendance totals for a member, optionally restricted to one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AttendanceSummary {
    pub total: u64,
    pub present: u64,
    pub late: u64,
    pub absent: u64,
    /// (present + late) / total × 100, two decimals; 0 when nothing is recorded.
    pub attendance_percentage: f64,
}

impl AttendanceSummary {
    #[must_use]
    pub fn from_counts(present: u64, late: u64, absent: u64) -> Self {
        let total = present + late + absent;
        #[allow(clippy::cast_precision_loss)]
        let attendance_percentage = if total == 0 {
            0.0
        } else {
            (((present + late) as f64 / total as f64) * 100.0 * 100.0).round() / 100.0
        };
        Self {
            total,
            present,
            late,
            absent,
            attendance_percentage,
        }
    }

    #[must_use]
    pub fn from_statuses<I: IntoIterator<Item = AttendanceStatus>>(statuses: I) -> Self {
        let (mut present, mut late, mut absent) = (0, 0, 0);
        for status in statuses {
            match status {
                AttendanceStatus::Present => present += 1,
                AttendanceStatus::Late => late += 1,
                AttendanceStatus::Absent => absent += 1,
            }
        }
        Self::from_counts(present, late, absent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary_is_zero_percent() {
        let summary = AttendanceSummary::from_counts(0, 0, 0);
        assert_eq!(summary.total, 0);
        assert!(summary.attendance_percentage.abs() < f64::EPSILON);
    }

    #[test]
    fn test_late_counts_towards_percentage() {
        let summary = AttendanceSummary::from_counts(2, 1, 1);
        assert_eq!(summary.total, 4);
        assert!((summary.attendance_percentage - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percentage_rounded_to_two_decimals() {
        let summary = AttendanceSummary::from_counts(1, 0, 2);
        assert!((summary.attendance_percentage - 33.33).abs() < 1e-9);
        let summary = AttendanceSummary::from_counts(2, 0, 1);
        assert!((summary.attendance_percentage - 66.67).abs() < 1e-9);
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_rejects_future_and_stale_dates() {
        let window = AttendanceWindow::ending_on(date(2024, 3, 31), 30);
        let class_start = date(2024, 1, 1);

        assert!(window.check(date(2024, 3, 31), class_start).is_ok());
        assert!(window.check(date(2024, 3, 1), class_start).is_ok());
        assert!(window.check(date(2024, 2, 29), class_start).is_err());
        assert!(window.check(date(2024, 4, 1), class_start).is_err());
    }

    #[test]
    fn test_window_respects_class_start() {
        let window = AttendanceWindow::ending_on(date(2024, 3, 31), 30);
        let err = window.check(date(2024, 3, 10), date(2024, 3, 15)).unwrap_err();
        assert!(err.contains("2024-03-15"));
    }

    #[test]
    fn test_remark_overwrites_status() {
        let enrollment = Enrollment::new(ClassId::new(), UserId::new());
        let marker = UserId::new();
        let mut mark = Attendance::new(&enrollment, date(2024, 3, 1), AttendanceStatus::Absent, UserId::new());
        mark.remark(AttendanceStatus::Late, marker);
        assert_eq!(mark.status, AttendanceStatus::Late);
        assert_eq!(mark.marked_by, marker);
        assert_eq!(mark.member_id, enrollment.member_id);
    }

    #[test]
    fn test_from_statuses() {
        let summary = AttendanceSummary::from_statuses([
            AttendanceStatus::Present,
            AttendanceStatus::Absent,
            AttendanceStatus::Late,
            AttendanceStatus::Present,
        ]);
        assert_eq!((summary.present, summary.late, summary.absent), (2, 1, 1));
    }
}
