//! MySQL membership repository implementation.

use super::{bind_u64, count, parse_enum, parse_id};
use crate::traits::MembershipRepository;
use crate::DatabasePool;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use gymdesk_core::{
    GymdeskError, GymdeskResult, Membership, MembershipStatus, MembershipType, Page, PageRequest, UserId,
};
use sqlx::{FromRow, MySql, MySqlExecutor, QueryBuilder};
use std::sync::Arc;
use tracing::{debug, info};

/// MySQL membership repository implementation.
#[derive(Clone)]
pub struct MySqlMembershipRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlMembershipRepository {
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
pub(super) struct MembershipRow {
    id: String,
    user_id: String,
    membership_type: String,
    status: String,
    start_date: NaiveDate,
    expiry_date: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = GymdeskError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(Membership {
            id: parse_id(&row.id, "memberships.id")?,
            user_id: parse_id(&row.user_id, "memberships.user_id")?,
            membership_type: parse_enum(&row.membership_type, "memberships.membership_type", MembershipType::parse)?,
            status: parse_enum(&row.status, "memberships.status", MembershipStatus::parse)?,
            start_date: row.start_date,
            expiry_date: row.expiry_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Loads a membership; with `lock` the row stays locked until the
/// surrounding transaction ends.
pub(super) async fn fetch_membership<'e, E: MySqlExecutor<'e>>(
    executor: E,
    user_id: UserId,
    lock: bool,
) -> GymdeskResult<Option<Membership>> {
    let sql = if lock {
        "SELECT id, user_id, membership_type, status, start_date, expiry_date, created_at, updated_at \
         FROM memberships WHERE user_id = ? FOR UPDATE"
    } else {
        "SELECT id, user_id, membership_type, status, start_date, expiry_date, created_at, updated_at \
         FROM memberships WHERE user_id = ?"
    };
    let row = sqlx::query_as::<_, MembershipRow>(sql)
        .bind(user_id.to_string())
        .fetch_optional(executor)
        .await?;

    row.map(Membership::try_from).transpose()
}

pub(super) async fn insert_membership<'e, E: MySqlExecutor<'e>>(
    executor: E,
    membership: &Membership,
) -> GymdeskResult<()> {
    sqlx::query(
        r"
        INSERT INTO memberships (id, user_id, membership_type, status, start_date, expiry_date, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(membership.id.to_string())
    .bind(membership.user_id.to_string())
    .bind(membership.membership_type.as_str())
    .bind(membership.status.as_str())
    .bind(membership.start_date)
    .bind(membership.expiry_date)
    .bind(membership.created_at)
    .bind(membership.updated_at)
    .execute(executor)
    .await?;
    Ok(())
}

pub(super) async fn update_membership<'e, E: MySqlExecutor<'e>>(
    executor: E,
    membership: &Membership,
) -> GymdeskResult<bool> {
    let result = sqlx::query(
        r"
        UPDATE memberships
        SET membership_type = ?, status = ?, start_date = ?, expiry_date = ?, updated_at = ?
        WHERE id = ?
        ",
    )
    .bind(membership.membership_type.as_str())
    .bind(membership.status.as_str())
    .bind(membership.start_date)
    .bind(membership.expiry_date)
    .bind(membership.updated_at)
    .bind(membership.id.to_string())
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Filters on the status as seen on `today`, where an overdue active row
/// counts as expired.
fn push_status_filter(builder: &mut QueryBuilder<'_, MySql>, status: Option<MembershipStatus>, today: NaiveDate) {
    match status {
        None => {}
        Some(MembershipStatus::Active) => {
            builder.push(" WHERE status = 'active' AND expiry_date >= ").push_bind(today);
        }
        Some(MembershipStatus::Expired) => {
            builder
                .push(" WHERE (status = 'expired' OR (status = 'active' AND expiry_date < ")
                .push_bind(today)
                .push("))");
        }
        Some(other) => {
            builder.push(" WHERE status = ").push_bind(other.as_str());
        }
    }
}

#[async_trait]
impl MembershipRepository for MySqlMembershipRepository {
    async fn find_by_user(&self, user_id: UserId) -> GymdeskResult<Option<Membership>> {
        debug!("Finding membership for user: {}", user_id);
        fetch_membership(self.pool.inner(), user_id, false).await
    }

    async fn find_all(
        &self,
        status: Option<MembershipStatus>,
        today: NaiveDate,
        page: PageRequest,
    ) -> GymdeskResult<Page<Membership>> {
        debug!("Finding memberships, status: {:?}", status);

        let mut count_query = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM memberships");
        push_status_filter(&mut count_query, status, today);
        let total = count_query.build_query_scalar::<i64>().fetch_one(self.pool.inner()).await?;

        let mut query = QueryBuilder::<MySql>::new(
            "SELECT id, user_id, membership_type, status, start_date, expiry_date, created_at, updated_at \
             FROM memberships",
        );
        push_status_filter(&mut query, status, today);
        query
            .push(" ORDER BY expiry_date ASC LIMIT ")
            .push_bind(bind_u64(page.limit()))
            .push(" OFFSET ")
            .push_bind(bind_u64(page.offset()));

        let rows = query.build_query_as::<MembershipRow>().fetch_all(self.pool.inner()).await?;
        let memberships = rows.into_iter().map(Membership::try_from).collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(memberships, page, count(total)))
    }

    async fn save(&self, membership: &Membership) -> GymdeskResult<Membership> {
        debug!("Saving membership for user: {}", membership.user_id);
        insert_membership(self.pool.inner(), membership).await?;
        self.find_by_user(membership.user_id)
            .await?
            .ok_or_else(|| GymdeskError::Internal("Failed to fetch inserted membership".to_string()))
    }

    async fn update(&self, membership: &Membership) -> GymdeskResult<Membership> {
        debug!("Updating membership: {}", membership.id);
        if !update_membership(self.pool.inner(), membership).await? {
            return Err(GymdeskError::not_found("Membership", membership.id));
        }
        self.find_by_user(membership.user_id)
            .await?
            .ok_or_else(|| GymdeskError::Internal("Failed to fetch updated membership".to_string()))
    }

    async fn renew(
        &self,
        user_id: UserId,
        membership_type: Option<MembershipType>,
        periods: u32,
        today: NaiveDate,
    ) -> GymdeskResult<Option<Membership>> {
        debug!("Renewing membership of user {} by {} periods", user_id, periods);

        let mut tx = self.pool.begin().await?;
        let Some(mut membership) = fetch_membership(&mut *tx, user_id, true).await? else {
            return Ok(None);
        };
        membership.renew(membership_type.unwrap_or(membership.membership_type), periods, today)?;
        update_membership(&mut *tx, &membership).await?;

        let renewed = fetch_membership(&mut *tx, user_id, false)
            .await?
            .ok_or_else(|| GymdeskError::Internal("Failed to fetch renewed membership".to_string()))?;
        tx.commit().await?;
        Ok(Some(renewed))
    }

    async fn expire_overdue(&self, today: NaiveDate) -> GymdeskResult<u64> {
        let result = sqlx::query(
            "UPDATE memberships SET status = 'expired', updated_at = ? WHERE status = 'active' AND expiry_date < ?",
        )
        .bind(Utc::now())
        .bind(today)
        .execute(self.pool.inner())
        .await?;

        info!("Expired {} overdue memberships", result.rows_affected());
        Ok(result.rows_affected())
    }

    async fn count_by_status(&self, status: MembershipStatus, today: NaiveDate) -> GymdeskResult<u64> {
        let mut query = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM memberships");
        push_status_filter(&mut query, Some(status), today);
        let total = query.build_query_scalar::<i64>().fetch_one(self.pool.inner()).await?;
        Ok(count(total))
    }
}

impl std::fmt::Debug for MySqlMembershipRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlMembershipRepository").finish_non_exhaustive()
    }
}
