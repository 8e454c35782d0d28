//! MySQL class repository implementation.

use super::{bind_u64, count, parse_id};
use crate::traits::{ClassFilter, ClassRepository};
use crate::DatabasePool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gymdesk_core::{ClassId, ClassUpdateOutcome, GymClass, GymdeskError, GymdeskResult, Page, PageRequest, TrainerId};
use sqlx::{FromRow, MySql, MySqlExecutor, QueryBuilder};
use std::sync::Arc;
use tracing::{debug, info};

const CLASS_COLUMNS: &str =
    "c.id, c.name, c.description, c.trainer_id, c.starts_at, c.ends_at, c.capacity, c.location, c.created_at, c.updated_at";

/// MySQL class repository implementation.
#[derive(Clone)]
pub struct MySqlClassRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlClassRepository {
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct ClassRow {
    id: String,
    name: String,
    description: Option<String>,
    trainer_id: String,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    capacity: u32,
    location: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ClassRow> for GymClass {
    type Error = GymdeskError;

    fn try_from(row: ClassRow) -> Result<Self, Self::Error> {
        Ok(GymClass {
            id: parse_id(&row.id, "classes.id")?,
            name: row.name,
            description: row.description,
            trainer_id: parse_id(&row.trainer_id, "classes.trainer_id")?,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            capacity: row.capacity,
            location: row.location,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Loads a class; with `lock` the row is held `FOR UPDATE`.
pub(super) async fn fetch_class<'e, E: MySqlExecutor<'e>>(
    executor: E,
    id: ClassId,
    lock: bool,
) -> GymdeskResult<Option<GymClass>> {
    let suffix = if lock { " FOR UPDATE" } else { "" };
    let row = sqlx::query_as::<_, ClassRow>(&format!("SELECT {CLASS_COLUMNS} FROM classes c WHERE c.id = ?{suffix}"))
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?;

    row.map(GymClass::try_from).transpose()
}

pub(super) async fn count_enrolled<'e, E: MySqlExecutor<'e>>(executor: E, id: ClassId) -> GymdeskResult<u64> {
    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM class_enrollments WHERE class_id = ? AND status = 'enrolled'")
            .bind(id.to_string())
            .fetch_one(executor)
            .await?;
    Ok(count(total))
}

async fn trainer_busy<'e, E: MySqlExecutor<'e>>(
    executor: E,
    trainer_id: TrainerId,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    exclude: Option<ClassId>,
) -> GymdeskResult<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        r"
        SELECT 1 FROM classes
        WHERE trainer_id = ? AND starts_at < ? AND ? < ends_at AND (? IS NULL OR id <> ?)
        LIMIT 1
        ",
    )
    .bind(trainer_id.to_string())
    .bind(ends_at)
    .bind(starts_at)
    .bind(exclude.map(|id| id.to_string()))
    .bind(exclude.map(|id| id.to_string()))
    .fetch_optional(executor)
    .await?;

    Ok(found.is_some())
}

fn push_class_filter(builder: &mut QueryBuilder<'_, MySql>, filter: &ClassFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(trainer_id) = filter.trainer_id {
        builder.push(" AND c.trainer_id = ").push_bind(trainer_id.to_string());
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search.to_lowercase());
        builder
            .push(" AND (LOWER(c.name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(COALESCE(c.location, '')) LIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(from) = filter.from {
        builder.push(" AND c.starts_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        builder.push(" AND c.starts_at < ").push_bind(to);
    }
}

#[async_trait]
impl ClassRepository for MySqlClassRepository {
    async fn find_by_id(&self, id: ClassId) -> GymdeskResult<Option<GymClass>> {
        debug!("Finding class by id: {}", id);
        fetch_class(self.pool.inner(), id, false).await
    }

    async fn find_all(&self, filter: &ClassFilter, page: PageRequest) -> GymdeskResult<Page<GymClass>> {
        debug!("Finding classes, page: {}, size: {}", page.page, page.size);

        let mut count_query = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM classes c");
        push_class_filter(&mut count_query, filter);
        let total = count_query.build_query_scalar::<i64>().fetch_one(self.pool.inner()).await?;

        let mut query = QueryBuilder::<MySql>::new(format!("SELECT {CLASS_COLUMNS} FROM classes c"));
        push_class_filter(&mut query, filter);
        query
            .push(" ORDER BY c.starts_at ASC LIMIT ")
            .push_bind(bind_u64(page.limit()))
            .push(" OFFSET ")
            .push_bind(bind_u64(page.offset()));

        let rows = query.build_query_as::<ClassRow>().fetch_all(self.pool.inner()).await?;
        let classes = rows.into_iter().map(GymClass::try_from).collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(classes, page, count(total)))
    }

    async fn has_overlap(
        &self,
        trainer_id: TrainerId,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        exclude: Option<ClassId>,
    ) -> GymdeskResult<bool> {
        trainer_busy(self.pool.inner(), trainer_id, starts_at, ends_at, exclude).await
    }

    async fn save(&self, class: &GymClass) -> GymdeskResult<GymClass> {
        debug!("Saving class: {}", class.name);
        sqlx::query(
            r"
            INSERT INTO classes (id, name, description, trainer_id, starts_at, ends_at, capacity, location,
                                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(class.id.to_string())
        .bind(&class.name)
        .bind(&class.description)
        .bind(class.trainer_id.to_string())
        .bind(class.starts_at)
        .bind(class.ends_at)
        .bind(class.capacity)
        .bind(&class.location)
        .bind(class.created_at)
        .bind(class.updated_at)
        .execute(self.pool.inner())
        .await?;

        self.find_by_id(class.id)
            .await?
            .ok_or_else(|| GymdeskError::Internal("Failed to fetch inserted class".to_string()))
    }

    async fn update(&self, class: &GymClass) -> GymdeskResult<ClassUpdateOutcome> {
        debug!("Updating class: {}", class.id);

        // Enrollment takes the same row lock, so the count below is final.
        let mut tx = self.pool.begin().await?;
        if fetch_class(&mut *tx, class.id, true).await?.is_none() {
            return Ok(ClassUpdateOutcome::NotFound);
        }

        let enrolled = count_enrolled(&mut *tx, class.id).await?;
        if u64::from(class.capacity) < enrolled {
            return Ok(ClassUpdateOutcome::CapacityBelowEnrolled { enrolled });
        }
        if trainer_busy(&mut *tx, class.trainer_id, class.starts_at, class.ends_at, Some(class.id)).await? {
            return Ok(ClassUpdateOutcome::TrainerBusy);
        }

        sqlx::query(
            r"
            UPDATE classes
            SET name = ?, description = ?, trainer_id = ?, starts_at = ?, ends_at = ?, capacity = ?,
                location = ?, updated_at = ?
            WHERE id = ?
            ",
        )
        .bind(&class.name)
        .bind(&class.description)
        .bind(class.trainer_id.to_string())
        .bind(class.starts_at)
        .bind(class.ends_at)
        .bind(class.capacity)
        .bind(&class.location)
        .bind(class.updated_at)
        .bind(class.id.to_string())
        .execute(&mut *tx)
        .await?;

        let updated = fetch_class(&mut *tx, class.id, false)
            .await?
            .ok_or_else(|| GymdeskError::Internal("Failed to fetch updated class".to_string()))?;
        tx.commit().await?;

        Ok(ClassUpdateOutcome::Updated {
            class: updated,
            enrolled,
        })
    }

    async fn delete(&self, id: ClassId) -> GymdeskResult<bool> {
        debug!("Deleting class: {}", id);
        let class_id = id.to_string();

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r"
            DELETE a FROM attendance a
            JOIN class_enrollments e ON e.id = a.enrollment_id
            WHERE e.class_id = ?
            ",
        )
        .bind(&class_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM class_enrollments WHERE class_id = ?")
            .bind(&class_id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM classes WHERE id = ?")
            .bind(&class_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        if result.rows_affected() > 0 {
            info!("Deleted class {}", id);
        }
        Ok(result.rows_affected() > 0)
    }

    async fn enrolled_count(&self, id: ClassId) -> GymdeskResult<u64> {
        count_enrolled(self.pool.inner(), id).await
    }

    async fn count(&self) -> GymdeskResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM classes")
            .fetch_one(self.pool.inner())
            .await?;
        Ok(count(total))
    }

    async fn count_upcoming(&self, now: DateTime<Utc>) -> GymdeskResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM classes WHERE starts_at >= ?")
            .bind(now)
            .fetch_one(self.pool.inner())
            .await?;
        Ok(count(total))
    }
}

impl std::fmt::Debug for MySqlClassRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlClassRepository").finish_non_exhaustive()
    }
}
