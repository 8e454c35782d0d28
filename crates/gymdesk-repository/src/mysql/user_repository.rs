//! MySQL user repository implementation.

use super::membership_repository::insert_membership;
use super::{bind_u64, count, parse_enum, parse_id};
use crate::traits::{UserFilter, UserRepository};
use crate::DatabasePool;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use gymdesk_core::{
    Email, GymdeskError, GymdeskResult, Membership, Page, PageRequest, User, UserId, UserRole, UserStatus,
};
use sqlx::{FromRow, MySql, MySqlExecutor, QueryBuilder};
use std::sync::Arc;
use tracing::{debug, info};

pub(super) const USER_COLUMNS: &str = "u.id, u.first_name, u.last_name, u.email, u.password_hash, u.role, u.phone, \
     u.date_of_birth, u.status, u.last_login_at, u.created_at, u.updated_at";

/// MySQL user repository implementation.
#[derive(Clone)]
pub struct MySqlUserRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlUserRepository {
    /// Creates a new MySQL user repository.
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

/// Database row representation of a user.
#[derive(Debug, FromRow)]
pub(super) struct UserRow {
    id: String,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    role: String,
    phone: Option<String>,
    date_of_birth: Option<NaiveDate>,
    status: String,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = GymdeskError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: parse_id(&row.id, "users.id")?,
            first_name: row.first_name,
            last_name: row.last_name,
            email: Email::new_unchecked(row.email),
            password_hash: row.password_hash,
            role: parse_enum(&row.role, "users.role", UserRole::parse)?,
            phone: row.phone,
            date_of_birth: row.date_of_birth,
            status: parse_enum(&row.status, "users.status", UserStatus::parse)?,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub(super) async fn fetch_user<'e, E: MySqlExecutor<'e>>(executor: E, id: UserId) -> GymdeskResult<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(
        r"
        SELECT u.id, u.first_name, u.last_name, u.email, u.password_hash, u.role, u.phone,
               u.date_of_birth, u.status, u.last_login_at, u.created_at, u.updated_at
        FROM users u
        WHERE u.id = ?
        ",
    )
    .bind(id.to_string())
    .fetch_optional(executor)
    .await?;

    row.map(User::try_from).transpose()
}

pub(super) async fn insert_user<'e, E: MySqlExecutor<'e>>(executor: E, user: &User) -> GymdeskResult<()> {
    sqlx::query(
        r"
        INSERT INTO users (id, first_name, last_name, email, password_hash, role, phone,
                           date_of_birth, status, last_login_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(user.id.to_string())
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.email.as_str())
    .bind(&user.password_hash)
    .bind(user.role.as_str())
    .bind(&user.phone)
    .bind(user.date_of_birth)
    .bind(user.status.as_str())
    .bind(user.last_login_at)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub(super) async fn update_user<'e, E: MySqlExecutor<'e>>(executor: E, user: &User) -> GymdeskResult<bool> {
    let result = sqlx::query(
        r"
        UPDATE users
        SET first_name = ?, last_name = ?, email = ?, password_hash = ?, role = ?, phone = ?,
            date_of_birth = ?, status = ?, last_login_at = ?, updated_at = ?
        WHERE id = ?
        ",
    )
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.email.as_str())
    .bind(&user.password_hash)
    .bind(user.role.as_str())
    .bind(&user.phone)
    .bind(user.date_of_birth)
    .bind(user.status.as_str())
    .bind(user.last_login_at)
    .bind(user.updated_at)
    .bind(user.id.to_string())
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

fn push_user_filter(builder: &mut QueryBuilder<'_, MySql>, filter: &UserFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(role) = filter.role {
        builder.push(" AND u.role = ").push_bind(role.as_str());
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search.to_lowercase());
        builder
            .push(" AND (LOWER(u.first_name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(u.last_name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(u.email) LIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, id: UserId) -> GymdeskResult<Option<User>> {
        debug!("Finding user by id: {}", id);
        fetch_user(self.pool.inner(), id).await
    }

    async fn find_by_email(&self, email: &str) -> GymdeskResult<Option<User>> {
        debug!("Finding user by email: {}", email);

        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT u.id, u.first_name, u.last_name, u.email, u.password_hash, u.role, u.phone,
                   u.date_of_birth, u.status, u.last_login_at, u.created_at, u.updated_at
            FROM users u
            WHERE LOWER(u.email) = LOWER(?)
            ",
        )
        .bind(email)
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn exists_by_email(&self, email: &str) -> GymdeskResult<bool> {
        let result: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE LOWER(email) = LOWER(?) LIMIT 1")
            .bind(email)
            .fetch_optional(self.pool.inner())
            .await?;

        Ok(result.is_some())
    }

    async fn find_all(&self, filter: &UserFilter, page: PageRequest) -> GymdeskResult<Page<User>> {
        debug!("Finding users, page: {}, size: {}", page.page, page.size);

        let mut count_query = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM users u");
        push_user_filter(&mut count_query, filter);
        let total: i64 = count_query.build_query_scalar::<i64>().fetch_one(self.pool.inner()).await?;

        let mut query = QueryBuilder::<MySql>::new(format!("SELECT {USER_COLUMNS} FROM users u"));
        push_user_filter(&mut query, filter);
        query
            .push(" ORDER BY u.created_at DESC LIMIT ")
            .push_bind(bind_u64(page.limit()))
            .push(" OFFSET ")
            .push_bind(bind_u64(page.offset()));

        let rows: Vec<UserRow> = query.build_query_as::<UserRow>().fetch_all(self.pool.inner()).await?;
        let users = rows.into_iter().map(User::try_from).collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(users, page, count(total)))
    }

    async fn save(&self, user: &User) -> GymdeskResult<User> {
        debug!("Saving new user: {}", user.email);
        insert_user(self.pool.inner(), user).await?;
        self.find_by_id(user.id)
            .await?
            .ok_or_else(|| GymdeskError::Internal("Failed to fetch inserted user".to_string()))
    }

    async fn register(&self, user: &User, membership: Option<&Membership>) -> GymdeskResult<User> {
        debug!("Registering user: {}", user.email);

        let mut tx = self.pool.begin().await?;
        insert_user(&mut *tx, user).await?;
        if let Some(membership) = membership {
            insert_membership(&mut *tx, membership).await?;
        }
        let saved = fetch_user(&mut *tx, user.id)
            .await?
            .ok_or_else(|| GymdeskError::Internal("Failed to fetch registered user".to_string()))?;
        tx.commit().await?;

        info!("Registered user {} with role {}", saved.id, saved.role);
        Ok(saved)
    }

    async fn update(&self, user: &User) -> GymdeskResult<User> {
        debug!("Updating user: {}", user.id);
        if !update_user(self.pool.inner(), user).await? {
            return Err(GymdeskError::not_found("User", user.id));
        }
        self.find_by_id(user.id)
            .await?
            .ok_or_else(|| GymdeskError::Internal("Failed to fetch updated user".to_string()))
    }

    async fn delete(&self, id: UserId) -> GymdeskResult<bool> {
        debug!("Deleting user: {}", id);
        let id = id.to_string();

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r"
            DELETE a FROM attendance a
            JOIN class_enrollments e ON e.id = a.enrollment_id
            WHERE e.member_id = ?
            ",
        )
        .bind(&id)
        .execute(&mut *tx)
        .await?;
        for statement in [
            "DELETE FROM class_enrollments WHERE member_id = ?",
            "DELETE FROM payments WHERE member_id = ?",
            "DELETE FROM workout_plans WHERE member_id = ?",
            "DELETE FROM meal_plans WHERE member_id = ?",
            "DELETE FROM memberships WHERE user_id = ?",
        ] {
            sqlx::query(statement).bind(&id).execute(&mut *tx).await?;
        }
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_by_role(&self, role: UserRole) -> GymdeskResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?")
            .bind(role.as_str())
            .fetch_one(self.pool.inner())
            .await?;

        Ok(count(total))
    }
}

impl std::fmt::Debug for MySqlUserRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlUserRepository").finish_non_exhaustive()
    }
}
