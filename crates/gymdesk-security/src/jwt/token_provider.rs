//! JWT token provider for creating and validating tokens.

use super::{Claims, TokenSubject};
use chrono::{DateTime, Duration, Utc};
use gymdesk_config::SecurityConfig;
use gymdesk_core::{GymdeskError, GymdeskResult, User};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Token pair containing access and refresh tokens.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    /// Access token (short-lived).
    pub access_token: String,
    /// Refresh token (long-lived).
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: i64,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: i64,
    /// Token type (always "Bearer").
    pub token_type: String,
}

/// JWT token provider service.
#[derive(Clone)]
pub struct TokenProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: Arc<SecurityConfig>,
    validation: Validation,
}

impl TokenProvider {
    /// Creates a new token provider.
    #[must_use]
    pub fn new(config: Arc<SecurityConfig>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.jwt_issuer]);
        validation.set_audience(&[&config.jwt_audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        Self {
            encoding_key,
            decoding_key,
            config,
            validation,
        }
    }

    fn subject_for(&self, user: &User) -> TokenSubject {
        TokenSubject {
            user_id: user.id,
            email: user.email.as_str().to_string(),
            role: user.role,
            issuer: self.config.jwt_issuer.clone(),
            audience: self.config.jwt_audience.clone(),
        }
    }

    fn expiry(secs: u64) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX / 1000))
    }

    /// Generates a token pair for a user.
    ///
    /// # Errors
    ///
    /// Returns an internal error if signing fails.
    pub fn generate_tokens(&self, user: &User) -> GymdeskResult<TokenPair> {
        let access_expires_at = Self::expiry(self.config.jwt_access_expiration_secs);
        let refresh_expires_at = Self::expiry(self.config.jwt_refresh_expiration_secs);

        let access_token = self.sign(&Claims::new_access(self.subject_for(user), access_expires_at))?;
        let refresh_token = self.sign(&Claims::new_refresh(self.subject_for(user), refresh_expires_at))?;

        debug!("Generated token pair for user {}", user.id);

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at: access_expires_at.timestamp(),
            refresh_expires_at: refresh_expires_at.timestamp(),
            token_type: "Bearer".to_string(),
        })
    }

    /// Generates a standalone access token.
    ///
    /// # Errors
    ///
    /// Returns an internal error if signing fails.
    pub fn generate_access_token(&self, user: &User) -> GymdeskResult<String> {
        let expires_at = Self::expiry(self.config.jwt_access_expiration_secs);
        self.sign(&Claims::new_access(self.subject_for(user), expires_at))
    }

    fn sign(&self, claims: &Claims) -> GymdeskResult<String> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| GymdeskError::Internal(format!("Failed to sign {} token: {e}", claims.token_type)))
    }

    /// Validates a token and returns the claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenExpired` for expired tokens and `InvalidToken` for
    /// anything else that fails verification.
    pub fn validate_token(&self, token: &str) -> GymdeskResult<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            warn!("Token validation failed: {}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => GymdeskError::TokenExpired,
                ErrorKind::InvalidToken | ErrorKind::InvalidSignature => {
                    GymdeskError::InvalidToken("Invalid token signature".to_string())
                }
                ErrorKind::InvalidIssuer => GymdeskError::InvalidToken("Invalid token issuer".to_string()),
                ErrorKind::InvalidAudience => GymdeskError::InvalidToken("Invalid token audience".to_string()),
                _ => GymdeskError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Validates an access token specifically.
    ///
    /// # Errors
    ///
    /// Fails when the token is invalid or is a refresh token.
    pub fn validate_access_token(&self, token: &str) -> GymdeskResult<Claims> {
        let claims = self.validate_token(token)?;

        if !claims.is_access_token() {
            return Err(GymdeskError::InvalidToken("Expected access token".to_string()));
        }

        Ok(claims)
    }

    /// Validates a refresh token specifically.
    ///
    /// # Errors
    ///
    /// Fails when the token is invalid or is an access token.
    pub fn validate_refresh_token(&self, token: &str) -> GymdeskResult<Claims> {
        let claims = self.validate_token(token)?;

        if !claims.is_refresh_token() {
            return Err(GymdeskError::InvalidToken("Expected refresh token".to_string()));
        }

        Ok(claims)
    }

    /// Access token lifetime in seconds.
    #[must_use]
    pub fn access_token_ttl_secs(&self) -> u64 {
        self.config.jwt_access_expiration_secs
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("issuer", &self.config.jwt_issuer)
            .field("audience", &self.config.jwt_audience)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymdesk_core::{Email, UserRole};

    fn provider() -> TokenProvider {
        TokenProvider::new(Arc::new(SecurityConfig {
            jwt_secret: "test-secret-key-that-is-at-least-32-chars".to_string(),
            ..SecurityConfig::default()
        }))
    }

    fn user(role: UserRole) -> User {
        User::new(
            "Dana".to_string(),
            "Reyes".to_string(),
            Email::new_unchecked("dana@gym.example"),
            "hash".to_string(),
            role,
        )
    }

    #[test]
    fn test_generate_and_validate_tokens() {
        let provider = provider();
        let user = user(UserRole::Trainer);

        let tokens = provider.generate_tokens(&user).unwrap();
        assert_eq!(tokens.token_type, "Bearer");
        assert!(tokens.refresh_expires_at > tokens.access_expires_at);

        let claims = provider.validate_access_token(&tokens.access_token).unwrap();
        assert_eq!(claims.user_id(), Some(user.id));
        assert_eq!(claims.role, UserRole::Trainer);
        assert_eq!(claims.email, "dana@gym.example");

        let refresh = provider.validate_refresh_token(&tokens.refresh_token).unwrap();
        assert!(refresh.is_refresh_token());
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let provider = provider();
        let tokens = provider.generate_tokens(&user(UserRole::Member)).unwrap();

        assert!(matches!(
            provider.validate_access_token(&tokens.refresh_token),
            Err(GymdeskError::InvalidToken(_))
        ));
        assert!(matches!(
            provider.validate_refresh_token(&tokens.access_token),
            Err(GymdeskError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let token = provider().generate_access_token(&user(UserRole::Admin)).unwrap();
        let other = TokenProvider::new(Arc::new(SecurityConfig {
            jwt_secret: "a-completely-different-secret-of-32-chars".to_string(),
            ..SecurityConfig::default()
        }));
        assert!(matches!(other.validate_token(&token), Err(GymdeskError::InvalidToken(_))));
    }

    #[test]
    fn test_expired_token() {
        let provider = provider();
        let subject = provider.subject_for(&user(UserRole::Member));
        let claims = Claims::new_access(subject, Utc::now() - Duration::minutes(10));
        let token = provider.sign(&claims).unwrap();
        assert!(matches!(provider.validate_token(&token), Err(GymdeskError::TokenExpired)));
    }

    #[test]
    fn test_garbage_token() {
        assert!(provider().validate_token("not.a.jwt").is_err());
    }
}
