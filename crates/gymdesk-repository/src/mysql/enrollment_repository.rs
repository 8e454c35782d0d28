//! MySQL enrollment repository implementation.

use super::class_repository::{count_enrolled, fetch_class};
use super::membership_repository::fetch_membership;
use super::user_repository::fetch_user;
use super::{bind_u64, count, parse_enum, parse_id};
use crate::traits::EnrollmentRepository;
use crate::DatabasePool;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use gymdesk_core::{
    ClassId, Enrollment, EnrollmentOutcome, EnrollmentStatus, GymdeskError, GymdeskResult, Page, PageRequest,
    UserId, UserRole,
};
use sqlx::{FromRow, MySqlExecutor};
use std::sync::Arc;
use tracing::{debug, info};

/// MySQL enrollment repository implementation.
#[derive(Clone)]
pub struct MySqlEnrollmentRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlEnrollmentRepository {
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct EnrollmentRow {
    id: String,
    class_id: String,
    member_id: String,
    status: String,
    enrolled_at: DateTime<Utc>,
}

impl TryFrom<EnrollmentRow> for Enrollment {
    type Error = GymdeskError;

    fn try_from(row: EnrollmentRow) -> Result<Self, Self::Error> {
        Ok(Enrollment {
            id: parse_id(&row.id, "class_enrollments.id")?,
            class_id: parse_id(&row.class_id, "class_enrollments.class_id")?,
            member_id: parse_id(&row.member_id, "class_enrollments.member_id")?,
            status: parse_enum(&row.status, "class_enrollments.status", EnrollmentStatus::parse)?,
            enrolled_at: row.enrolled_at,
        })
    }
}

pub(super) async fn fetch_enrollment<'e, E: MySqlExecutor<'e>>(
    executor: E,
    class_id: ClassId,
    member_id: UserId,
) -> GymdeskResult<Option<Enrollment>> {
    let row = sqlx::query_as::<_, EnrollmentRow>(
        r"
        SELECT id, class_id, member_id, status, enrolled_at
        FROM class_enrollments
        WHERE class_id = ? AND member_id = ?
        ",
    )
    .bind(class_id.to_string())
    .bind(member_id.to_string())
    .fetch_optional(executor)
    .await?;

    row.map(Enrollment::try_from).transpose()
}

#[async_trait]
impl EnrollmentRepository for MySqlEnrollmentRepository {
    async fn enroll(
        &self,
        class_id: ClassId,
        member_id: UserId,
        membership_required_on: Option<NaiveDate>,
    ) -> GymdeskResult<EnrollmentOutcome> {
        debug!("Enrolling member {} in class {}", member_id, class_id);

        let mut tx = self.pool.begin().await?;

        // Locking the class row serializes concurrent enrollments for it.
        let Some(class) = fetch_class(&mut *tx, class_id, true).await? else {
            return Ok(EnrollmentOutcome::ClassNotFound);
        };
        match fetch_user(&mut *tx, member_id).await? {
            Some(user) if user.role == UserRole::Member => {}
            _ => return Ok(EnrollmentOutcome::NotAMember),
        }
        if let Some(today) = membership_required_on {
            let active = fetch_membership(&mut *tx, member_id, false)
                .await?
                .is_some_and(|m| m.is_active_on(today));
            if !active {
                return Ok(EnrollmentOutcome::MembershipInactive);
            }
        }
        if fetch_enrollment(&mut *tx, class_id, member_id).await?.is_some() {
            return Ok(EnrollmentOutcome::AlreadyEnrolled);
        }
        if count_enrolled(&mut *tx, class_id).await? >= u64::from(class.capacity) {
            return Ok(EnrollmentOutcome::ClassFull {
                capacity: class.capacity,
            });
        }

        let enrollment = Enrollment::new(class_id, member_id);
        sqlx::query(
            r"
            INSERT INTO class_enrollments (id, class_id, member_id, status, enrolled_at)
            VALUES (?, ?, ?, ?, ?)
            ",
        )
        .bind(enrollment.id.to_string())
        .bind(class_id.to_string())
        .bind(member_id.to_string())
        .bind(enrollment.status.as_str())
        .bind(enrollment.enrolled_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!("Member {} enrolled in class {}", member_id, class_id);
        Ok(EnrollmentOutcome::Enrolled(enrollment))
    }

    async fn unenroll(&self, class_id: ClassId, member_id: UserId) -> GymdeskResult<bool> {
        debug!("Removing member {} from class {}", member_id, class_id);

        let mut tx = self.pool.begin().await?;
        let Some(enrollment) = fetch_enrollment(&mut *tx, class_id, member_id).await? else {
            return Ok(false);
        };
        sqlx::query("DELETE FROM attendance WHERE enrollment_id = ?")
            .bind(enrollment.id.to_string())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM class_enrollments WHERE id = ?")
            .bind(enrollment.id.to_string())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("Member {} removed from class {}", member_id, class_id);
        Ok(true)
    }

    async fn find(&self, class_id: ClassId, member_id: UserId) -> GymdeskResult<Option<Enrollment>> {
        fetch_enrollment(self.pool.inner(), class_id, member_id).await
    }

    async fn find_by_class(&self, class_id: ClassId, page: PageRequest) -> GymdeskResult<Page<Enrollment>> {
        debug!("Finding enrollments for class: {}", class_id);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM class_enrollments WHERE class_id = ?")
            .bind(class_id.to_string())
            .fetch_one(self.pool.inner())
            .await?;

        let rows = sqlx::query_as::<_, EnrollmentRow>(
            r"
            SELECT id, class_id, member_id, status, enrolled_at
            FROM class_enrollments
            WHERE class_id = ?
            ORDER BY enrolled_at ASC
            LIMIT ? OFFSET ?
            ",
        )
        .bind(class_id.to_string())
        .bind(bind_u64(page.limit()))
        .bind(bind_u64(page.offset()))
        .fetch_all(self.pool.inner())
        .await?;

        let enrollments = rows.into_iter().map(Enrollment::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(enrollments, page, count(total)))
    }

    async fn find_by_member(&self, member_id: UserId, page: PageRequest) -> GymdeskResult<Page<Enrollment>> {
        debug!("Finding enrollments for member: {}", member_id);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM class_enrollments WHERE member_id = ?")
            .bind(member_id.to_string())
            .fetch_one(self.pool.inner())
            .await?;

        let rows = sqlx::query_as::<_, EnrollmentRow>(
            r"
            SELECT id, class_id, member_id, status, enrolled_at
            FROM class_enrollments
            WHERE member_id = ?
            ORDER BY enrolled_at DESC
            LIMIT ? OFFSET ?
            ",
        )
        .bind(member_id.to_string())
        .bind(bind_u64(page.limit()))
        .bind(bind_u64(page.offset()))
        .fetch_all(self.pool.inner())
        .await?;

        let enrollments = rows.into_iter().map(Enrollment::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(enrollments, page, count(total)))
    }
}

impl std::fmt::Debug for MySqlEnrollmentRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlEnrollmentRepository").finish_non_exhaustive()
    }
}
