//! Payment controller.

use super::parse_id;
use crate::{
    extractors::{AuthenticatedUser, PaginationQuery, ValidatedJson},
    responses::{created, ok, ApiResult, CreatedResult},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Router,
};
use chrono::{DateTime, Utc};
use gymdesk_core::{PaymentId, PaymentStatus, UserId};
use gymdesk_repository::PaymentFilter;
use gymdesk_service::{
    PageResponse, PaymentResponse, ProcessPaymentRequest, ProcessPaymentResponse, UpdatePaymentStatusRequest,
};
use serde::Deserialize;
use tracing::debug;
use utoipa::IntoParams;

/// Filters for `GET /payments`; results are newest first.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaymentListQuery {
    pub member_id: Option<UserId>,
    pub status: Option<PaymentStatus>,
    /// Paid at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Paid before this instant.
    pub to: Option<DateTime<Utc>>,
}

impl From<PaymentListQuery> for PaymentFilter {
    fn from(query: PaymentListQuery) -> Self {
        Self {
            member_id: query.member_id,
            status: query.status,
            from: query.from,
            to: query.to,
        }
    }
}

/// Creates the payment router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments).post(process_payment))
        .route("/:id", get(get_payment))
        .route("/:id/status", patch(update_payment_status))
}

/// Record a completed payment, renewing the membership when a type is given (admin only).
#[utoipa::path(
    post,
    path = "/payments",
    tag = "payments",
    request_body = ProcessPaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = ProcessPaymentResponse),
        (status = 400, description = "Invalid amount, or the target is not a member"),
        (status = 404, description = "No such user")
    ),
    security(("bearer_auth" = []))
)]
pub async fn process_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<ProcessPaymentRequest>,
) -> CreatedResult<ProcessPaymentResponse> {
    debug!("Process payment request for member: {}", request.member_id);

    let response = state.services.payments.process_payment(&user, request).await?;
    created(response)
}

#[utoipa::path(
    get,
    path = "/payments",
    tag = "payments",
    params(PaymentListQuery, PaginationQuery),
    responses((status = 200, description = "A page of payments", body = PageResponse<PaymentResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_payments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<PaymentListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<PageResponse<PaymentResponse>> {
    let response = state
        .services
        .payments
        .list_payments(&user, query.into(), pagination.into())
        .await?;
    ok(response)
}

#[utoipa::path(
    get,
    path = "/payments/{id}",
    tag = "payments",
    params(("id" = PaymentId, Path, description = "Payment id")),
    responses(
        (status = 200, description = "The payment", body = PaymentResponse),
        (status = 404, description = "No such payment")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<PaymentResponse> {
    let payment_id: PaymentId = parse_id("payment", &id)?;

    let response = state.services.payments.get_payment(&user, payment_id).await?;
    ok(response)
}

/// Move a payment along `pending → completed | failed` or `completed → refunded`.
#[utoipa::path(
    patch,
    path = "/payments/{id}/status",
    tag = "payments",
    params(("id" = PaymentId, Path, description = "Payment id")),
    request_body = UpdatePaymentStatusRequest,
    responses(
        (status = 200, description = "Updated payment", body = PaymentResponse),
        (status = 400, description = "Transition not allowed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_payment_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdatePaymentStatusRequest>,
) -> ApiResult<PaymentResponse> {
    let payment_id: PaymentId = parse_id("payment", &id)?;

    let response = state
        .services
        .payments
        .update_status(&user, payment_id, request)
        .await?;
    ok(response)
}
