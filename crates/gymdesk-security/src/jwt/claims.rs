//! JWT claims structure.

use chrono::{DateTime, Utc};
use gymdesk_core::{UserId, UserRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of every token the API issues. `token_type` keeps refresh tokens
/// from being accepted as bearer tokens and the other way round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a string; `user_id` carries the same value typed.
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub email: String,
    pub role: UserRole,
    pub token_type: TokenType,

    pub iat: i64,
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    pub iss: String,
    pub aud: String,
    /// Unique per token.
    pub jti: String,
}

/// Fields shared by access and refresh claims.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: UserId,
    pub email: String,
    pub role: UserRole,
    pub issuer: String,
    pub audience: String,
}

impl Claims {
    fn build(subject: TokenSubject, token_type: TokenType, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: subject.user_id.to_string(),
            user_id: Some(subject.user_id.into_inner()),
            email: subject.email,
            role: subject.role,
            token_type,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            nbf: Some(now.timestamp()),
            iss: subject.issuer,
            aud: subject.audience,
            jti: Uuid::now_v7().to_string(),
        }
    }

    /// Creates new access token claims.
    #[must_use]
    pub fn new_access(subject: TokenSubject, expires_at: DateTime<Utc>) -> Self {
        Self::build(subject, TokenType::Access, expires_at)
    }

    /// Creates new refresh token claims.
    #[must_use]
    pub fn new_refresh(subject: TokenSubject, expires_at: DateTime<Utc>) -> Self {
        Self::build(subject, TokenType::Refresh, expires_at)
    }

    /// Returns the user ID, falling back to parsing `sub`.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
            .map(UserId::from_uuid)
            .or_else(|| UserId::parse(&self.sub).ok())
    }

    /// Checks if the token is expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Checks if the user has the required role.
    #[must_use]
    pub const fn has_role(&self, required: UserRole) -> bool {
        self.role.has_permission(required)
    }

    /// Checks if this is an access token.
    #[must_use]
    pub const fn is_access_token(&self) -> bool {
        matches!(self.token_type, TokenType::Access)
    }

    /// Checks if this is a refresh token.
    #[must_use]
    pub const fn is_refresh_token(&self) -> bool {
        matches!(self.token_type, TokenType::Refresh)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn subject(role: UserRole) -> TokenSubject {
        TokenSubject {
            user_id: UserId::new(),
            email: "coach@gym.example".to_string(),
            role,
            issuer: "issuer".to_string(),
            audience: "audience".to_string(),
        }
    }

    #[test]
    fn test_access_token_claims() {
        let claims = Claims::new_access(subject(UserRole::Member), Utc::now() + Duration::hours(1));
        assert!(claims.is_access_token());
        assert!(!claims.is_refresh_token());
        assert!(!claims.is_expired());
        assert_eq!(claims.user_id().map(|id| id.to_string()), Some(claims.sub.clone()));
    }

    #[test]
    fn test_expired_claims() {
        let claims = Claims::new_refresh(subject(UserRole::Member), Utc::now() - Duration::minutes(5));
        assert!(claims.is_refresh_token());
        assert!(claims.is_expired());
    }

    #[test]
    fn test_user_id_falls_back_to_subject() {
        let mut claims = Claims::new_access(subject(UserRole::Trainer), Utc::now() + Duration::hours(1));
        let expected = claims.user_id();
        claims.user_id = None;
        assert_eq!(claims.user_id(), expected);
    }

    #[test]
    fn test_role_check() {
        let claims = Claims::new_access(subject(UserRole::Trainer), Utc::now() + Duration::hours(1));
        assert!(claims.has_role(UserRole::Member));
        assert!(claims.has_role(UserRole::Trainer));
        assert!(!claims.has_role(UserRole::Admin));
    }
}
