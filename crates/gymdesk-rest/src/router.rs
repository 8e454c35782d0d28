//! Main application router.

use crate::{
    controllers::{
        attendance_controller, auth_controller, class_controller, dashboard_controller, enrollment_controller,
        health_controller, meal_plan_controller, member_controller, membership_controller, payment_controller,
        trainer_controller, user_controller, workout_plan_controller,
    },
    middleware::{auth_middleware, logging_middleware, AuthMiddlewareState, REQUEST_ID_HEADER},
    openapi::ApiDoc,
    state::AppState,
};
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use gymdesk_config::ServerConfig;
use gymdesk_service::Services;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Creates the main application router.
///
/// Health probes and the Swagger UI sit at the root; the API lives under
/// `/api/v1` behind the bearer-token middleware.
pub fn create_router(services: Services, server_config: &ServerConfig) -> Router {
    let auth_state = AuthMiddlewareState::new(Arc::clone(&services.tokens));
    let state = AppState::new(services);

    let classes = class_controller::router()
        .merge(enrollment_controller::router())
        .merge(attendance_controller::class_router());

    let api_router = Router::new()
        .nest("/auth", auth_controller::router())
        .nest("/users", user_controller::router())
        .nest("/trainers", trainer_controller::router())
        .nest("/memberships", membership_controller::router())
        .nest("/classes", classes)
        .nest("/members", member_controller::router())
        .nest("/attendance", attendance_controller::router())
        .nest("/payments", payment_controller::router())
        .nest("/workout-plans", workout_plan_controller::router())
        .nest("/meal-plans", meal_plan_controller::router())
        .nest("/dashboard", dashboard_controller::router())
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware));

    let mut router = Router::new()
        .merge(health_controller::router())
        .nest("/api/v1", api_router)
        .route("/", get(root))
        .with_state(state);

    if server_config.swagger_enabled {
        router = router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let router = router.layer(middleware::from_fn(logging_middleware)).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(PropagateRequestIdLayer::new(request_id))
            .layer(TraceLayer::new_for_http())
            .layer(create_cors_layer(server_config))
            .layer(CompressionLayer::new())
            .layer(TimeoutLayer::new(server_config.request_timeout()))
            .map_response(|res: axum::http::Response<_>| res.map(axum::body::Body::new))
            .layer(RequestBodyLimitLayer::new(server_config.max_body_size)),
    );

    info!(
        "Router created with REST endpoints{}",
        if server_config.swagger_enabled {
            " and Swagger UI at /swagger-ui"
        } else {
            ""
        }
    );
    router
}

/// Creates a CORS layer based on server configuration.
fn create_cors_layer(server_config: &ServerConfig) -> CorsLayer {
    if !server_config.cors_enabled {
        return CorsLayer::new();
    }
    if server_config.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = server_config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

/// Root endpoint handler.
async fn root() -> &'static str {
    "Gymdesk API v1"
}
