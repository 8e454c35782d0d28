//! User role value object.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gym user roles with hierarchical permissions.
///
/// All three roles live in the same users table; the role column
/// discriminates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Gym member.
    #[default]
    Member,
    /// Trainer who runs classes and writes plans.
    Trainer,
    /// Front-desk / owner with full access.
    Admin,
}

impl UserRole {
    /// Returns the role's permission level (higher = more permissions).
    #[must_use]
    pub const fn level(&self) -> u8 {
        match self {
            Self::Member => 1,
            Self::Trainer => 2,
            Self::Admin => 3,
        }
    }

    /// Checks if this role has at least the permissions of the required role.
    #[must_use]
    pub const fn has_permission(&self, required: Self) -> bool {
        self.level() >= required.level()
    }

    /// Returns all available roles.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Member, Self::Trainer, Self::Admin]
    }

    /// Returns the database / token representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Trainer => "trainer",
            Self::Admin => "admin",
        }
    }

    /// Parses a role from a string, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "member" => Some(Self::Member),
            "trainer" => Some(Self::Trainer),
            "admin" | "administrator" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission types for RBAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    // Users
    UserRead,
    UserManage,

    // Trainers
    TrainerRead,
    TrainerManage,

    // Memberships
    MembershipManage,

    // Classes
    ClassRead,
    ClassManage,

    // Enrollment and attendance
    EnrollmentManage,
    AttendanceMark,

    // Payments
    PaymentRead,
    PaymentProcess,

    // Workout and meal plans
    PlanRead,
    PlanManage,

    // Reporting
    DashboardView,
}

impl Permission {
    /// Returns the minimum role required for this permission.
    ///
    /// Ownership rules (a member reading their own payments, a trainer editing
    /// their own class) are layered on top of this table by the callers.
    #[must_use]
    pub const fn minimum_role(&self) -> UserRole {
        match self {
            Self::TrainerRead | Self::ClassRead | Self::PlanRead | Self::PaymentRead => UserRole::Member,
            Self::UserRead | Self::EnrollmentManage | Self::AttendanceMark | Self::PlanManage => {
                UserRole::Trainer
            }
            Self::UserManage
            | Self::TrainerManage
            | Self::MembershipManage
            | Self::ClassManage
            | Self::PaymentProcess
            | Self::DashboardView => UserRole::Admin,
        }
    }

    /// Checks if the given role has this permission.
    #[must_use]
    pub const fn is_allowed_for(&self, role: UserRole) -> bool {
        role.has_permission(self.minimum_role())
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UserRead => "user:read",
            Self::UserManage => "user:manage",
            Self::TrainerRead => "trainer:read",
            Self::TrainerManage => "trainer:manage",
            Self::MembershipManage => "membership:manage",
            Self::ClassRead => "class:read",
            Self::ClassManage => "class:manage",
            Self::EnrollmentManage => "enrollment:manage",
            Self::AttendanceMark => "attendance:mark",
            Self::PaymentRead => "payment:read",
            Self::PaymentProcess => "payment:process",
            Self::PlanRead => "plan:read",
            Self::PlanManage => "plan:manage",
            Self::DashboardView => "dashboard:view",
        };
        f.write_str(name)
    }
}
