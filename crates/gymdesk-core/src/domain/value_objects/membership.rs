//! Membership plan and state.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a paid membership period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MembershipType {
    Monthly,
    Quarterly,
    HalfYearly,
    Annual,
}

impl MembershipType {
    /// Number of calendar months one period of this type covers.
    #[must_use]
    pub const fn months(&self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::HalfYearly => 6,
            Self::Annual => 12,
        }
    }

    /// Returns `from` advanced by `periods` periods of this type.
    ///
    /// Month arithmetic clamps to the end of the month, so 31 January plus one
    /// month is 28 (or 29) February.
    #[must_use]
    pub fn extend(&self, from: NaiveDate, periods: u32) -> Option<NaiveDate> {
        from.checked_add_months(Months::new(self.months().checked_mul(periods)?))
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::HalfYearly => "half_yearly",
            Self::Annual => "annual",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            "half_yearly" => Some(Self::HalfYearly),
            "annual" => Some(Self::Annual),
            _ => None,
        }
    }
}

impl fmt::Display for MembershipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored state of a membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    #[default]
    Active,
    Expired,
    Suspended,
    Cancelled,
}

impl MembershipStatus {
    /// Cancelled memberships are closed for good; everything else can be renewed.
    #[must_use]
    pub const fn can_renew(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Suspended => "suspended",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "expired" => Some(Self::Expired),
            "suspended" => Some(Self::Suspended),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_months_per_type() {
        assert_eq!(MembershipType::Monthly.months(), 1);
        assert_eq!(MembershipType::Quarterly.months(), 3);
        assert_eq!(MembershipType::HalfYearly.months(), 6);
        assert_eq!(MembershipType::Annual.months(), 12);
    }

    #[test]
    fn test_extend_by_periods() {
        let start = date(2024, 3, 15);
        assert_eq!(MembershipType::Quarterly.extend(start, 2), Some(date(2024, 9, 15)));
        assert_eq!(MembershipType::Annual.extend(start, 1), Some(date(2025, 3, 15)));
    }

    #[test]
    fn test_extend_clamps_to_month_end() {
        assert_eq!(MembershipType::Monthly.extend(date(2024, 1, 31), 1), Some(date(2024, 2, 29)));
        assert_eq!(MembershipType::Monthly.extend(date(2023, 1, 31), 1), Some(date(2023, 2, 28)));
    }

    #[test]
    fn test_cancelled_cannot_renew() {
        assert!(MembershipStatus::Expired.can_renew());
        assert!(MembershipStatus::Suspended.can_renew());
        assert!(!MembershipStatus::Cancelled.can_renew());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&MembershipType::HalfYearly).unwrap(), "\"half_yearly\"");
        assert_eq!(MembershipType::parse("half_yearly"), Some(MembershipType::HalfYearly));
    }
}
