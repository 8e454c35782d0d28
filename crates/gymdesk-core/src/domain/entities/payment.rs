//! Payment entity.

use super::super::value_objects::{MembershipType, PaymentMethod, PaymentStatus};
use super::membership::Membership;
use crate::{Entity, GymdeskError, GymdeskResult, PaymentId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Money received from a member. Amounts are integer cents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub member_id: UserId,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Set when the payment buys a membership period.
    pub membership_type: Option<MembershipType>,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a completed payment.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the amount is not positive.
    pub fn completed(member_id: UserId, amount_cents: i64, method: PaymentMethod) -> GymdeskResult<Self> {
        if amount_cents <= 0 {
            return Err(GymdeskError::validation("amount must be greater than zero"));
        }
        let now = Utc::now();
        Ok(Self {
            id: PaymentId::new(),
            member_id,
            amount_cents,
            method,
            status: PaymentStatus::Completed,
            membership_type: None,
            reference: None,
            notes: None,
            paid_at: now,
            created_at: now,
        })
    }

    /// Moves the payment to `next`.
    ///
    /// # Errors
    ///
    /// Returns a business-rule error for transitions the lifecycle does not allow.
    pub fn transition_to(&mut self, next: PaymentStatus) -> GymdeskResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(GymdeskError::business_rule(format!(
                "payment cannot move from {} to {next}",
                self.status
            )));
        }
        self.status = next;
        Ok(())
    }
}

/// A recorded payment and the membership it renewed, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedPayment {
    pub payment: Payment,
    pub membership: Option<Membership>,
}

impl Entity<PaymentId> for Payment {
    fn id(&self) -> &PaymentId {
        &self.id
    }
}
