//! Membership details.

use super::super::value_objects::{MembershipStatus, MembershipType};
use crate::{Entity, GymdeskError, GymdeskResult, MembershipId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Per-user membership type, status and expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub user_id: UserId,
    pub membership_type: MembershipType,
    pub status: MembershipStatus,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    /// Starts a fresh membership covering one period from `start_date`.
    ///
    /// # Errors
    ///
    /// Fails only when the expiry would overflow the calendar.
    pub fn start(user_id: UserId, membership_type: MembershipType, start_date: NaiveDate) -> GymdeskResult<Self> {
        let expiry_date = membership_type
            .extend(start_date, 1)
            .ok_or_else(|| GymdeskError::validation("membership expiry out of range"))?;
        let now = Utc::now();
        Ok(Self {
            id: MembershipId::new(),
            user_id,
            membership_type,
            status: MembershipStatus::Active,
            start_date,
            expiry_date,
            created_at: now,
            updated_at: now,
        })
    }

    /// Status as seen on `today`: an active row past its expiry reads as expired.
    #[must_use]
    pub fn effective_status(&self, today: NaiveDate) -> MembershipStatus {
        if self.status == MembershipStatus::Active && self.expiry_date < today {
            MembershipStatus::Expired
        } else {
            self.status
        }
    }

    #[must_use]
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.effective_status(today) == MembershipStatus::Active
    }

    /// Days left until expiry, zero once expired.
    #[must_use]
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.expiry_date - today).num_days().max(0)
    }

    /// Extends the membership by `periods` periods of `membership_type`.
    ///
    /// The extension starts from whichever is later, the current expiry or
    /// `today`, so a lapsed membership does not get back-dated time.
    ///
    /// # Errors
    ///
    /// Returns a business-rule error for cancelled memberships and a
    /// validation error when `periods` is zero.
    pub fn renew(&mut self, membership_type: MembershipType, periods: u32, today: NaiveDate) -> GymdeskResult<()> {
        if !self.status.can_renew() {
            return Err(GymdeskError::business_rule("a cancelled membership cannot be renewed"));
        }
        if periods == 0 {
            return Err(GymdeskError::validation("periods must be at least 1"));
        }

        let lapsed = self.expiry_date < today;
        let base = self.expiry_date.max(today);
        self.expiry_date = membership_type
            .extend(base, periods)
            .ok_or_else(|| GymdeskError::validation("membership expiry out of range"))?;
        if lapsed {
            self.start_date = today;
        }
        self.membership_type = membership_type;
        self.status = MembershipStatus::Active;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Marks an overdue active membership as expired. Returns whether it changed.
    pub fn expire_if_overdue(&mut self, today: NaiveDate) -> bool {
        if self.status == MembershipStatus::Active && self.expiry_date < today {
            self.status = MembershipStatus::Expired;
            self.updated_at = Utc::now();
            return true;
        }
        false
    }
}

impl Entity<MembershipId> for Membership {
    fn id(&self) -> &MembershipId {
        &self.id
    }
}
