//! MySQL payment repository implementation.

use super::membership_repository::{fetch_membership, insert_membership, update_membership};
use super::{bind_u64, count, parse_enum, parse_id};
use crate::traits::{MembershipRenewal, PaymentFilter, PaymentRepository};
use crate::DatabasePool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gymdesk_core::{
    GymdeskError, GymdeskResult, Membership, MembershipType, Page, PageRequest, Payment, PaymentId, PaymentMethod,
    PaymentStatus, ProcessedPayment,
};
use sqlx::{FromRow, MySql, MySqlExecutor, QueryBuilder};
use std::sync::Arc;
use tracing::{debug, info};

const PAYMENT_COLUMNS: &str =
    "id, member_id, amount_cents, method, status, membership_type, reference, notes, paid_at, created_at";

/// MySQL payment repository implementation.
#[derive(Clone)]
pub struct MySqlPaymentRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlPaymentRepository {
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PaymentRow {
    id: String,
    member_id: String,
    amount_cents: i64,
    method: String,
    status: String,
    membership_type: Option<String>,
    reference: Option<String>,
    notes: Option<String>,
    paid_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = GymdeskError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: parse_id(&row.id, "payments.id")?,
            member_id: parse_id(&row.member_id, "payments.member_id")?,
            amount_cents: row.amount_cents,
            method: parse_enum(&row.method, "payments.method", PaymentMethod::parse)?,
            status: parse_enum(&row.status, "payments.status", PaymentStatus::parse)?,
            membership_type: row
                .membership_type
                .as_deref()
                .map(|t| parse_enum(t, "payments.membership_type", MembershipType::parse))
                .transpose()?,
            reference: row.reference,
            notes: row.notes,
            paid_at: row.paid_at,
            created_at: row.created_at,
        })
    }
}

async fn fetch_payment<'e, E: MySqlExecutor<'e>>(executor: E, id: PaymentId) -> GymdeskResult<Option<Payment>> {
    let row = sqlx::query_as::<_, PaymentRow>(&format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = ?"))
        .bind(id.to_string())
        .fetch_optional(executor)
        .await?;

    row.map(Payment::try_from).transpose()
}

fn push_payment_filter(builder: &mut QueryBuilder<'_, MySql>, filter: &PaymentFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(member_id) = filter.member_id {
        builder.push(" AND member_id = ").push_bind(member_id.to_string());
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(from) = filter.from {
        builder.push(" AND paid_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        builder.push(" AND paid_at < ").push_bind(to);
    }
}

#[async_trait]
impl PaymentRepository for MySqlPaymentRepository {
    async fn process(&self, payment: &Payment, renewal: Option<MembershipRenewal>) -> GymdeskResult<ProcessedPayment> {
        debug!("Processing payment {} for member {}", payment.id, payment.member_id);

        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!(
            "INSERT INTO payments ({PAYMENT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(payment.id.to_string())
        .bind(payment.member_id.to_string())
        .bind(payment.amount_cents)
        .bind(payment.method.as_str())
        .bind(payment.status.as_str())
        .bind(payment.membership_type.map(|t| t.as_str()))
        .bind(&payment.reference)
        .bind(&payment.notes)
        .bind(payment.paid_at)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await?;

        let membership = match renewal {
            None => None,
            Some(renewal) => match fetch_membership(&mut *tx, payment.member_id, true).await? {
                Some(mut membership) => {
                    membership.renew(renewal.membership_type, 1, renewal.today)?;
                    update_membership(&mut *tx, &membership).await?;
                    Some(membership)
                }
                None => {
                    let membership = Membership::start(payment.member_id, renewal.membership_type, renewal.today)?;
                    insert_membership(&mut *tx, &membership).await?;
                    Some(membership)
                }
            },
        };

        let saved = fetch_payment(&mut *tx, payment.id)
            .await?
            .ok_or_else(|| GymdeskError::Internal("Failed to fetch inserted payment".to_string()))?;
        tx.commit().await?;

        info!(
            "Recorded payment {} of {} cents for member {}",
            saved.id, saved.amount_cents, saved.member_id
        );
        Ok(ProcessedPayment {
            payment: saved,
            membership,
        })
    }

    async fn find_by_id(&self, id: PaymentId) -> GymdeskResult<Option<Payment>> {
        debug!("Finding payment by id: {}", id);
        fetch_payment(self.pool.inner(), id).await
    }

    async fn find_all(&self, filter: &PaymentFilter, page: PageRequest) -> GymdeskResult<Page<Payment>> {
        debug!("Finding payments, page: {}, size: {}", page.page, page.size);

        let mut count_query = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM payments");
        push_payment_filter(&mut count_query, filter);
        let total = count_query.build_query_scalar::<i64>().fetch_one(self.pool.inner()).await?;

        let mut query = QueryBuilder::<MySql>::new(format!("SELECT {PAYMENT_COLUMNS} FROM payments"));
        push_payment_filter(&mut query, filter);
        query
            .push(" ORDER BY paid_at DESC LIMIT ")
            .push_bind(bind_u64(page.limit()))
            .push(" OFFSET ")
            .push_bind(bind_u64(page.offset()));

        let rows = query.build_query_as::<PaymentRow>().fetch_all(self.pool.inner()).await?;
        let payments = rows.into_iter().map(Payment::try_from).collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(payments, page, count(total)))
    }

    async fn update(&self, payment: &Payment) -> GymdeskResult<Payment> {
        debug!("Updating payment: {}", payment.id);
        let result = sqlx::query("UPDATE payments SET status = ?, reference = ?, notes = ? WHERE id = ?")
            .bind(payment.status.as_str())
            .bind(&payment.reference)
            .bind(&payment.notes)
            .bind(payment.id.to_string())
            .execute(self.pool.inner())
            .await?;

        if result.rows_affected() == 0 {
            return Err(GymdeskError::not_found("Payment", payment.id));
        }
        self.find_by_id(payment.id)
            .await?
            .ok_or_else(|| GymdeskError::Internal("Failed to fetch updated payment".to_string()))
    }

    async fn revenue_cents(&self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> GymdeskResult<i64> {
        let mut query = QueryBuilder::<MySql>::new(
            "SELECT CAST(COALESCE(SUM(amount_cents), 0) AS SIGNED) FROM payments WHERE status = 'completed'",
        );
        if let Some(from) = from {
            query.push(" AND paid_at >= ").push_bind(from);
        }
        if let Some(to) = to {
            query.push(" AND paid_at < ").push_bind(to);
        }

        Ok(query.build_query_scalar::<i64>().fetch_one(self.pool.inner()).await?)
    }
}

impl std::fmt::Debug for MySqlPaymentRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlPaymentRepository").finish_non_exhaustive()
    }
}
