//! The authenticated caller as seen by the service layer.

use crate::Claims;
use gymdesk_core::{GymdeskError, GymdeskResult, UserId, UserRole};
use serde::{Deserialize, Serialize};

/// Identity and role of the caller of a service operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: UserRole,
}

impl Principal {
    #[must_use]
    pub const fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    #[must_use]
    pub const fn is_trainer(&self) -> bool {
        matches!(self.role, UserRole::Trainer)
    }

    #[must_use]
    pub const fn is_member(&self) -> bool {
        matches!(self.role, UserRole::Member)
    }
}

impl TryFrom<&Claims> for Principal {
    type Error = GymdeskError;

    fn try_from(claims: &Claims) -> GymdeskResult<Self> {
        let user_id = claims
            .user_id()
            .ok_or_else(|| GymdeskError::InvalidToken("Token subject is not a user id".to_string()))?;
        Ok(Self::new(user_id, claims.role))
    }
}
