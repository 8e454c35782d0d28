//! Dashboard statistics.

use crate::dto::DashboardStats;
use async_trait::async_trait;
use chrono::{Datelike, TimeZone, Utc};
use gymdesk_core::{Clock, GymdeskError, GymdeskResult, MembershipStatus, Permission, UserRole};
use gymdesk_repository::{ClassRepository, MembershipRepository, PaymentRepository, TrainerRepository, UserRepository};
use gymdesk_security::{ClaimsExt, Principal};
use std::sync::Arc;
use tracing::debug;

/// Dashboard service trait.
#[async_trait]
pub trait DashboardService: Send + Sync {
    /// Headline counts and revenue (admin only).
    async fn stats(&self, principal: &Principal) -> GymdeskResult<DashboardStats>;
}

pub struct DashboardServiceImpl {
    user_repository: Arc<dyn UserRepository>,
    trainer_repository: Arc<dyn TrainerRepository>,
    membership_repository: Arc<dyn MembershipRepository>,
    class_repository: Arc<dyn ClassRepository>,
    payment_repository: Arc<dyn PaymentRepository>,
    clock: Arc<dyn Clock>,
}

impl DashboardServiceImpl {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        trainer_repository: Arc<dyn TrainerRepository>,
        membership_repository: Arc<dyn MembershipRepository>,
        class_repository: Arc<dyn ClassRepository>,
        payment_repository: Arc<dyn PaymentRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repository,
            trainer_repository,
            membership_repository,
            class_repository,
            payment_repository,
            clock,
        }
    }
}

#[async_trait]
impl DashboardService for DashboardServiceImpl {
    async fn stats(&self, principal: &Principal) -> GymdeskResult<DashboardStats> {
        debug!("Computing dashboard stats");

        principal.require_permission(Permission::DashboardView)?;

        let now = self.clock.now();
        let today = now.date_naive();
        let month_start = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .ok_or_else(|| GymdeskError::internal("start of month out of range"))?;

        Ok(DashboardStats {
            total_members: self.user_repository.count_by_role(UserRole::Member).await?,
            total_trainers: self.trainer_repository.count().await?,
            total_classes: self.class_repository.count().await?,
            active_memberships: self
                .membership_repository
                .count_by_status(MembershipStatus::Active, today)
                .await?,
            expired_memberships: self
                .membership_repository
                .count_by_status(MembershipStatus::Expired, today)
                .await?,
            upcoming_classes: self.class_repository.count_upcoming(now).await?,
            revenue_cents_total: self.payment_repository.revenue_cents(None, None).await?,
            revenue_cents_this_month: self.payment_repository.revenue_cents(Some(month_start), None).await?,
        })
    }
}

impl std::fmt::Debug for DashboardServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardServiceImpl").finish_non_exhaustive()
    }
}
