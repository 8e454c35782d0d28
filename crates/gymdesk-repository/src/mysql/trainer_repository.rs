//! MySQL trainer repository implementation.

use super::user_repository::{insert_user, update_user, UserRow};
use super::{bind_u64, count, parse_id};
use crate::traits::TrainerRepository;
use crate::DatabasePool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gymdesk_core::{GymdeskError, GymdeskResult, Page, PageRequest, Trainer, TrainerId, TrainerProfile, User, UserId};
use sqlx::{FromRow, MySql, MySqlExecutor, QueryBuilder};
use std::sync::Arc;
use tracing::{debug, info};

const TRAINER_SELECT: &str = "SELECT t.id AS trainer_id, t.specialization, t.experience_years, t.certification, \
     t.bio, t.hourly_rate_cents, t.created_at AS trainer_created_at, t.updated_at AS trainer_updated_at, \
     u.id, u.first_name, u.last_name, u.email, u.password_hash, u.role, u.phone, u.date_of_birth, u.status, \
     u.last_login_at, u.created_at, u.updated_at \
     FROM trainers t JOIN users u ON u.id = t.user_id";

/// MySQL trainer repository implementation.
#[derive(Clone)]
pub struct MySqlTrainerRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlTrainerRepository {
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

/// A trainer row joined with its user row.
#[derive(Debug, FromRow)]
struct TrainerRow {
    trainer_id: String,
    specialization: String,
    experience_years: u32,
    certification: Option<String>,
    bio: Option<String>,
    hourly_rate_cents: Option<i64>,
    trainer_created_at: DateTime<Utc>,
    trainer_updated_at: DateTime<Utc>,
    #[sqlx(flatten)]
    user: UserRow,
}

impl TryFrom<TrainerRow> for TrainerProfile {
    type Error = GymdeskError;

    fn try_from(row: TrainerRow) -> Result<Self, Self::Error> {
        let user = User::try_from(row.user)?;
        Ok(TrainerProfile {
            trainer: Trainer {
                id: parse_id(&row.trainer_id, "trainers.id")?,
                user_id: user.id,
                specialization: row.specialization,
                experience_years: row.experience_years,
                certification: row.certification,
                bio: row.bio,
                hourly_rate_cents: row.hourly_rate_cents,
                created_at: row.trainer_created_at,
                updated_at: row.trainer_updated_at,
            },
            user,
        })
    }
}

async fn fetch_trainer<'e, E: MySqlExecutor<'e>>(executor: E, id: TrainerId) -> GymdeskResult<Option<TrainerProfile>> {
    let row = sqlx::query_as::<_, TrainerRow>(&format!("{TRAINER_SELECT} WHERE t.id = ?"))
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?;

    row.map(TrainerProfile::try_from).transpose()
}

fn push_search(builder: &mut QueryBuilder<'_, MySql>, search: Option<&str>) {
    if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search.to_lowercase());
        builder
            .push(" WHERE (LOWER(u.first_name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(u.last_name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(t.specialization) LIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl TrainerRepository for MySqlTrainerRepository {
    async fn find_by_id(&self, id: TrainerId) -> GymdeskResult<Option<TrainerProfile>> {
        debug!("Finding trainer by id: {}", id);
        fetch_trainer(self.pool.inner(), id).await
    }

    async fn find_by_user_id(&self, user_id: UserId) -> GymdeskResult<Option<TrainerProfile>> {
        debug!("Finding trainer by user id: {}", user_id);
        let row = sqlx::query_as::<_, TrainerRow>(&format!("{TRAINER_SELECT} WHERE t.user_id = ?"))
            .bind(user_id.to_string())
            .fetch_optional(self.pool.inner())
            .await?;

        row.map(TrainerProfile::try_from).transpose()
    }

    async fn find_all(&self, search: Option<&str>, page: PageRequest) -> GymdeskResult<Page<TrainerProfile>> {
        debug!("Finding trainers, page: {}, size: {}", page.page, page.size);

        let mut count_query =
            QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM trainers t JOIN users u ON u.id = t.user_id");
        push_search(&mut count_query, search);
        let total = count_query.build_query_scalar::<i64>().fetch_one(self.pool.inner()).await?;

        let mut query = QueryBuilder::<MySql>::new(TRAINER_SELECT);
        push_search(&mut query, search);
        query
            .push(" ORDER BY u.last_name, u.first_name LIMIT ")
            .push_bind(bind_u64(page.limit()))
            .push(" OFFSET ")
            .push_bind(bind_u64(page.offset()));

        let rows = query.build_query_as::<TrainerRow>().fetch_all(self.pool.inner()).await?;
        let trainers = rows.into_iter().map(TrainerProfile::try_from).collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(trainers, page, count(total)))
    }

    async fn create(&self, profile: &TrainerProfile) -> GymdeskResult<TrainerProfile> {
        debug!("Creating trainer for user: {}", profile.user.email);
        let trainer = &profile.trainer;

        let mut tx = self.pool.begin().await?;
        insert_user(&mut *tx, &profile.user).await?;
        sqlx::query(
            r"
            INSERT INTO trainers (id, user_id, specialization, experience_years, certification, bio,
                                  hourly_rate_cents, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(trainer.id.to_string())
        .bind(trainer.user_id.to_string())
        .bind(&trainer.specialization)
        .bind(trainer.experience_years)
        .bind(&trainer.certification)
        .bind(&trainer.bio)
        .bind(trainer.hourly_rate_cents)
        .bind(trainer.created_at)
        .bind(trainer.updated_at)
        .execute(&mut *tx)
        .await?;
        let saved = fetch_trainer(&mut *tx, trainer.id)
            .await?
            .ok_or_else(|| GymdeskError::Internal("Failed to fetch inserted trainer".to_string()))?;
        tx.commit().await?;

        info!("Created trainer {}", saved.trainer.id);
        Ok(saved)
    }

    async fn update(&self, profile: &TrainerProfile) -> GymdeskResult<TrainerProfile> {
        debug!("Updating trainer: {}", profile.trainer.id);
        let trainer = &profile.trainer;

        let mut tx = self.pool.begin().await?;
        if !update_user(&mut *tx, &profile.user).await? {
            return Err(GymdeskError::not_found("Trainer", trainer.id));
        }
        let result = sqlx::query(
            r"
            UPDATE trainers
            SET specialization = ?, experience_years = ?, certification = ?, bio = ?,
                hourly_rate_cents = ?, updated_at = ?
            WHERE id = ?
            ",
        )
        .bind(&trainer.specialization)
        .bind(trainer.experience_years)
        .bind(&trainer.certification)
        .bind(&trainer.bio)
        .bind(trainer.hourly_rate_cents)
        .bind(trainer.updated_at)
        .bind(trainer.id.to_string())
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(GymdeskError::not_found("Trainer", trainer.id));
        }
        let saved = fetch_trainer(&mut *tx, trainer.id)
            .await?
            .ok_or_else(|| GymdeskError::Internal("Failed to fetch updated trainer".to_string()))?;
        tx.commit().await?;

        Ok(saved)
    }

    async fn delete(&self, id: TrainerId) -> GymdeskResult<bool> {
        debug!("Deleting trainer: {}", id);
        let trainer_id = id.to_string();

        let mut tx = self.pool.begin().await?;
        let user_id: Option<String> = sqlx::query_scalar("SELECT user_id FROM trainers WHERE id = ? FOR UPDATE")
            .bind(&trainer_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(user_id) = user_id else {
            return Ok(false);
        };

        for statement in [
            r"DELETE a FROM attendance a
              JOIN class_enrollments e ON e.id = a.enrollment_id
              JOIN classes c ON c.id = e.class_id
              WHERE c.trainer_id = ?",
            r"DELETE e FROM class_enrollments e
              JOIN classes c ON c.id = e.class_id
              WHERE c.trainer_id = ?",
            "DELETE FROM classes WHERE trainer_id = ?",
            "UPDATE workout_plans SET trainer_id = NULL WHERE trainer_id = ?",
            "UPDATE meal_plans SET trainer_id = NULL WHERE trainer_id = ?",
            "DELETE FROM trainers WHERE id = ?",
        ] {
            sqlx::query(statement).bind(&trainer_id).execute(&mut *tx).await?;
        }
        sqlx::query("DELETE FROM memberships WHERE user_id = ?")
            .bind(&user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(&user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("Deleted trainer {} and user {}", id, user_id);
        Ok(true)
    }

    async fn count(&self) -> GymdeskResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trainers")
            .fetch_one(self.pool.inner())
            .await?;
        Ok(count(total))
    }
}

impl std::fmt::Debug for MySqlTrainerRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlTrainerRepository").finish_non_exhaustive()
    }
}
