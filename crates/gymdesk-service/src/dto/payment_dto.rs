//! Payment DTOs.

use super::MembershipResponse;
use chrono::{DateTime, Utc};
use gymdesk_core::{MembershipType, Payment, PaymentId, PaymentMethod, PaymentStatus, UserId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Records a completed payment, optionally buying a membership period.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProcessPaymentRequest {
    pub member_id: UserId,

    #[validate(range(min = 1, message = "Amount must be greater than zero"))]
    pub amount_cents: i64,

    pub method: PaymentMethod,

    /// Renews (or starts) the member's membership by one period of this type.
    pub membership_type: Option<MembershipType>,

    #[validate(length(max = 100))]
    pub reference: Option<String>,

    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePaymentStatusRequest {
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub id: PaymentId,
    pub member_id: UserId,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub membership_type: Option<MembershipType>,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            member_id: payment.member_id,
            amount_cents: payment.amount_cents,
            method: payment.method,
            status: payment.status,
            membership_type: payment.membership_type,
            reference: payment.reference,
            notes: payment.notes,
            paid_at: payment.paid_at,
            created_at: payment.created_at,
        }
    }
}

/// The stored payment and the membership it paid for, if any.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProcessPaymentResponse {
    pub payment: PaymentResponse,
    pub membership: Option<MembershipResponse>,
}
