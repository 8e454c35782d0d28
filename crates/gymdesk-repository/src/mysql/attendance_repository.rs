//! MySQL attendance repository implementation.

use super::enrollment_repository::fetch_enrollment;
use super::{bind_u64, count, parse_enum, parse_id};
use crate::traits::{AttendanceRepository, MarkAttendance};
use crate::DatabasePool;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use gymdesk_core::{
    Attendance, AttendanceOutcome, AttendanceStatus, AttendanceSummary, ClassId, GymdeskError, GymdeskResult, Page,
    PageRequest, UserId,
};
use sqlx::{FromRow, MySql, QueryBuilder};
use std::sync::Arc;
use tracing::debug;

const ATTENDANCE_SELECT: &str = "SELECT a.id, a.enrollment_id, e.class_id, e.member_id, a.attendance_date, \
     a.status, a.marked_by, a.marked_at \
     FROM attendance a JOIN class_enrollments e ON e.id = a.enrollment_id";

/// MySQL attendance repository implementation.
#[derive(Clone)]
pub struct MySqlAttendanceRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlAttendanceRepository {
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AttendanceRow {
    id: String,
    enrollment_id: String,
    class_id: String,
    member_id: String,
    attendance_date: NaiveDate,
    status: String,
    marked_by: String,
    marked_at: DateTime<Utc>,
}

impl TryFrom<AttendanceRow> for Attendance {
    type Error = GymdeskError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        Ok(Attendance {
            id: parse_id(&row.id, "attendance.id")?,
            enrollment_id: parse_id(&row.enrollment_id, "attendance.enrollment_id")?,
            class_id: parse_id(&row.class_id, "class_enrollments.class_id")?,
            member_id: parse_id(&row.member_id, "class_enrollments.member_id")?,
            attendance_date: row.attendance_date,
            status: parse_enum(&row.status, "attendance.status", AttendanceStatus::parse)?,
            marked_by: parse_id(&row.marked_by, "attendance.marked_by")?,
            marked_at: row.marked_at,
        })
    }
}

fn push_member_filter(builder: &mut QueryBuilder<'_, MySql>, member_id: UserId, class_id: Option<ClassId>) {
    builder.push(" WHERE e.member_id = ").push_bind(member_id.to_string());
    if let Some(class_id) = class_id {
        builder.push(" AND e.class_id = ").push_bind(class_id.to_string());
    }
}

#[async_trait]
impl AttendanceRepository for MySqlAttendanceRepository {
    async fn mark(&self, request: &MarkAttendance) -> GymdeskResult<AttendanceOutcome> {
        debug!(
            "Marking attendance for member {} in class {} on {}",
            request.member_id, request.class_id, request.date
        );

        let mut tx = self.pool.begin().await?;

        let Some(enrollment) = fetch_enrollment(&mut *tx, request.class_id, request.member_id).await? else {
            return Ok(AttendanceOutcome::EnrollmentNotFound);
        };
        let starts_at: DateTime<Utc> = sqlx::query_scalar("SELECT starts_at FROM classes WHERE id = ?")
            .bind(request.class_id.to_string())
            .fetch_one(&mut *tx)
            .await?;
        if let Err(reason) = request.window.check(request.date, starts_at.date_naive()) {
            return Ok(AttendanceOutcome::DateOutOfRange(reason));
        }

        let existing = sqlx::query_as::<_, AttendanceRow>(&format!(
            "{ATTENDANCE_SELECT} WHERE a.enrollment_id = ? AND a.attendance_date = ? FOR UPDATE"
        ))
        .bind(enrollment.id.to_string())
        .bind(request.date)
        .fetch_optional(&mut *tx)
        .await?
        .map(Attendance::try_from)
        .transpose()?;

        let outcome = if let Some(mut attendance) = existing {
            attendance.remark(request.status, request.marked_by);
            sqlx::query("UPDATE attendance SET status = ?, marked_by = ?, marked_at = ? WHERE id = ?")
                .bind(attendance.status.as_str())
                .bind(attendance.marked_by.to_string())
                .bind(attendance.marked_at)
                .bind(attendance.id.to_string())
                .execute(&mut *tx)
                .await?;
            AttendanceOutcome::Updated(attendance)
        } else {
            let attendance = Attendance::new(&enrollment, request.date, request.status, request.marked_by);
            sqlx::query(
                r"
                INSERT INTO attendance (id, enrollment_id, attendance_date, status, marked_by, marked_at)
                VALUES (?, ?, ?, ?, ?, ?)
                ",
            )
            .bind(attendance.id.to_string())
            .bind(attendance.enrollment_id.to_string())
            .bind(attendance.attendance_date)
            .bind(attendance.status.as_str())
            .bind(attendance.marked_by.to_string())
            .bind(attendance.marked_at)
            .execute(&mut *tx)
            .await?;
            AttendanceOutcome::Recorded(attendance)
        };
        tx.commit().await?;

        Ok(outcome)
    }

    async fn find_by_class_and_date(&self, class_id: ClassId, date: NaiveDate) -> GymdeskResult<Vec<Attendance>> {
        debug!("Finding attendance for class {} on {}", class_id, date);

        let rows = sqlx::query_as::<_, AttendanceRow>(&format!(
            "{ATTENDANCE_SELECT} WHERE e.class_id = ? AND a.attendance_date = ? ORDER BY a.marked_at"
        ))
        .bind(class_id.to_string())
        .bind(date)
        .fetch_all(self.pool.inner())
        .await?;

        rows.into_iter().map(Attendance::try_from).collect()
    }

    async fn find_by_member(
        &self,
        member_id: UserId,
        class_id: Option<ClassId>,
        page: PageRequest,
    ) -> GymdeskResult<Page<Attendance>> {
        debug!("Finding attendance for member: {}", member_id);

        let mut count_query = QueryBuilder::<MySql>::new(
            "SELECT COUNT(*) FROM attendance a JOIN class_enrollments e ON e.id = a.enrollment_id",
        );
        push_member_filter(&mut count_query, member_id, class_id);
        let total = count_query.build_query_scalar::<i64>().fetch_one(self.pool.inner()).await?;

        let mut query = QueryBuilder::<MySql>::new(ATTENDANCE_SELECT);
        push_member_filter(&mut query, member_id, class_id);
        query
            .push(" ORDER BY a.attendance_date DESC LIMIT ")
            .push_bind(bind_u64(page.limit()))
            .push(" OFFSET ")
            .push_bind(bind_u64(page.offset()));

        let rows = query.build_query_as::<AttendanceRow>().fetch_all(self.pool.inner()).await?;
        let marks = rows.into_iter().map(Attendance::try_from).collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(marks, page, count(total)))
    }

    async fn summary(&self, member_id: UserId, class_id: Option<ClassId>) -> GymdeskResult<AttendanceSummary> {
        let mut query = QueryBuilder::<MySql>::new(
            "SELECT a.status, COUNT(*) FROM attendance a JOIN class_enrollments e ON e.id = a.enrollment_id",
        );
        push_member_filter(&mut query, member_id, class_id);
        query.push(" GROUP BY a.status");

        let rows: Vec<(String, i64)> = query.build_query_as().fetch_all(self.pool.inner()).await?;

        let (mut present, mut late, mut absent) = (0, 0, 0);
        for (status, total) in rows {
            match parse_enum(&status, "attendance.status", AttendanceStatus::parse)? {
                AttendanceStatus::Present => present = count(total),
                AttendanceStatus::Late => late = count(total),
                AttendanceStatus::Absent => absent = count(total),
            }
        }

        Ok(AttendanceSummary::from_counts(present, late, absent))
    }
}

impl std::fmt::Debug for MySqlAttendanceRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlAttendanceRepository").finish_non_exhaustive()
    }
}
