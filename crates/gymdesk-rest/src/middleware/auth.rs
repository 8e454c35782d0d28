//! Authentication middleware.

use crate::extractors::RejectedToken;
use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use gymdesk_security::{Principal, TokenProvider};
use std::sync::Arc;
use tracing::{debug, warn};

/// Authentication middleware state.
#[derive(Clone, Debug)]
pub struct AuthMiddlewareState {
    pub token_provider: Arc<TokenProvider>,
}

impl AuthMiddlewareState {
    pub fn new(token_provider: Arc<TokenProvider>) -> Self {
        Self { token_provider }
    }
}

/// Verifies the bearer token, if any, and stores the caller in the request
/// extensions.
///
/// Requests are never rejected here: public routes (register, login,
/// refresh) must pass without a token, so the decision is left to the
/// [`crate::extractors::AuthenticatedUser`] extractor. The principal is also
/// copied onto the response for the logging middleware.
pub async fn auth_middleware(
    State(state): State<AuthMiddlewareState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let mut principal = None;

    if let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>() {
        let verified = state
            .token_provider
            .validate_access_token(bearer.token())
            .and_then(|claims| Principal::try_from(&claims));

        match verified {
            Ok(caller) => {
                debug!("Authenticated user: {} ({})", caller.user_id, caller.role);
                request.extensions_mut().insert(caller);
                principal = Some(caller);
            }
            Err(e) => {
                warn!("Rejected bearer token: {}", e);
                request.extensions_mut().insert(RejectedToken);
            }
        }
    }

    let mut response = next.run(request).await;
    if let Some(caller) = principal {
        response.extensions_mut().insert(caller);
    }
    response
}
