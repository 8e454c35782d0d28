//! Authenticated caller extractor.

use crate::responses::AppError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use gymdesk_core::GymdeskError;
use gymdesk_security::Principal;

/// The caller of a protected route.
///
/// The auth middleware verifies the bearer token once per request and leaves
/// the resulting [`Principal`] in the request extensions; this extractor only
/// reads it back. A request without one is answered with 401.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Principal);

impl std::ops::Deref for AuthenticatedUser {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Marker left in the extensions when a bearer token was sent but rejected.
#[derive(Debug, Clone, Copy)]
pub struct RejectedToken;

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(AuthenticatedUser(*principal));
        }

        let err = if parts.extensions.get::<RejectedToken>().is_some() {
            GymdeskError::InvalidToken("Invalid or expired token".to_string())
        } else {
            GymdeskError::unauthorized("Missing bearer token")
        };
        Err(AppError(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use gymdesk_core::{UserId, UserRole};

    async fn extract(request: Request<()>) -> Result<AuthenticatedUser, AppError> {
        let (mut parts, ()) = request.into_parts();
        AuthenticatedUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_reads_principal_from_extensions() {
        let principal = Principal::new(UserId::new(), UserRole::Trainer);
        let mut request = Request::new(());
        request.extensions_mut().insert(principal);

        let user = extract(request).await.unwrap();
        assert_eq!(user.0, principal);
        assert!(user.is_trainer());
    }

    #[tokio::test]
    async fn test_missing_and_rejected_tokens_are_401() {
        let err = extract(Request::new(())).await.unwrap_err();
        assert_eq!(err.0.error_code(), "UNAUTHORIZED");

        let mut request = Request::new(());
        request.extensions_mut().insert(RejectedToken);
        let err = extract(request).await.unwrap_err();
        assert_eq!(err.0.status_code(), 401);
        assert_eq!(err.0.error_code(), "INVALID_TOKEN");
    }
}
