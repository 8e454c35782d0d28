//! Membership DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use gymdesk_core::{Membership, MembershipId, MembershipStatus, MembershipType, UserId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Opens a membership for a member (admin only).
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMembershipRequest {
    pub user_id: UserId,
    pub membership_type: MembershipType,
    /// Defaults to today.
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateMembershipRequest {
    pub membership_type: Option<MembershipType>,
    pub status: Option<MembershipStatus>,
}

/// Extends a membership by whole periods.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RenewMembershipRequest {
    /// Keeps the current type when omitted.
    pub membership_type: Option<MembershipType>,

    #[validate(range(min = 1, max = 24, message = "Periods must be between 1 and 24"))]
    #[serde(default = "one_period")]
    pub periods: u32,
}

const fn one_period() -> u32 {
    1
}

/// Membership as seen on a given day.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MembershipResponse {
    pub id: MembershipId,
    pub user_id: UserId,
    pub membership_type: MembershipType,
    /// Effective status: an active membership past its expiry reads as expired.
    pub status: MembershipStatus,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub days_remaining: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MembershipResponse {
    #[must_use]
    pub fn on(membership: Membership, today: NaiveDate) -> Self {
        Self {
            status: membership.effective_status(today),
            days_remaining: membership.days_remaining(today),
            id: membership.id,
            user_id: membership.user_id,
            membership_type: membership.membership_type,
            start_date: membership.start_date,
            expiry_date: membership.expiry_date,
            created_at: membership.created_at,
            updated_at: membership.updated_at,
        }
    }
}

/// Result of the expiry sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct ExpireMembershipsResponse {
    pub expired: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renew_request_defaults_to_one_period() {
        let request: RenewMembershipRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.periods, 1);
        assert!(request.membership_type.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_renew_request_rejects_zero_periods() {
        let request: RenewMembershipRequest = serde_json::from_str(r#"{"periods": 0}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_response_reports_effective_status() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let membership = Membership::start(UserId::new(), MembershipType::Monthly, start).unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let response = MembershipResponse::on(membership, later);
        assert_eq!(response.status, MembershipStatus::Expired);
        assert_eq!(response.days_remaining, 0);
    }
}
