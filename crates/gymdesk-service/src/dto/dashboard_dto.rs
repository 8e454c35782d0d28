//! Dashboard DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Gym-wide counters for the admin dashboard. Revenue counts completed payments only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total_members: u64,
    pub total_trainers: u64,
    pub total_classes: u64,
    pub active_memberships: u64,
    pub expired_memberships: u64,
    pub upcoming_classes: u64,
    pub revenue_cents_total: i64,
    pub revenue_cents_this_month: i64,
}
