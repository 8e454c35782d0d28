//! Membership controller.

use super::parse_id;
use crate::{
    extractors::{AuthenticatedUser, PaginationQuery, ValidatedJson},
    responses::{created, ok, ApiResult, CreatedResult},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Router,
};
use gymdesk_core::{MembershipStatus, UserId};
use gymdesk_service::{
    CreateMembershipRequest, ExpireMembershipsResponse, MembershipResponse, PageResponse, RenewMembershipRequest,
    UpdateMembershipRequest,
};
use serde::Deserialize;
use tracing::debug;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MembershipListQuery {
    /// Effective status: an active membership past its expiry counts as expired.
    pub status: Option<MembershipStatus>,
}

/// Creates the membership router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_memberships).post(create_membership))
        .route("/expire", post(expire_memberships))
        .route("/:user_id", get(get_membership).put(update_membership))
        .route("/:user_id/renew", post(renew_membership))
}

#[utoipa::path(
    get,
    path = "/memberships",
    tag = "memberships",
    params(MembershipListQuery, PaginationQuery),
    responses((status = 200, description = "A page of memberships", body = PageResponse<MembershipResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_memberships(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<MembershipListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<PageResponse<MembershipResponse>> {
    let response = state
        .services
        .memberships
        .list_memberships(&user, query.status, pagination.into())
        .await?;
    ok(response)
}

#[utoipa::path(
    post,
    path = "/memberships",
    tag = "memberships",
    request_body = CreateMembershipRequest,
    responses(
        (status = 201, description = "Membership opened", body = MembershipResponse),
        (status = 409, description = "The member already has a membership")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_membership(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateMembershipRequest>,
) -> CreatedResult<MembershipResponse> {
    debug!("Create membership request for user: {}", request.user_id);

    let response = state.services.memberships.create_membership(&user, request).await?;
    created(response)
}

#[utoipa::path(
    get,
    path = "/memberships/{user_id}",
    tag = "memberships",
    params(("user_id" = UserId, Path, description = "Member's user id")),
    responses(
        (status = 200, description = "The membership", body = MembershipResponse),
        (status = 404, description = "No membership for this user")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_membership(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<String>,
) -> ApiResult<MembershipResponse> {
    let user_id: UserId = parse_id("user", &user_id)?;

    let response = state.services.memberships.get_membership(&user, user_id).await?;
    ok(response)
}

#[utoipa::path(
    put,
    path = "/memberships/{user_id}",
    tag = "memberships",
    params(("user_id" = UserId, Path, description = "Member's user id")),
    request_body = UpdateMembershipRequest,
    responses((status = 200, description = "Updated membership", body = MembershipResponse)),
    security(("bearer_auth" = []))
)]
pub async fn update_membership(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateMembershipRequest>,
) -> ApiResult<MembershipResponse> {
    let user_id: UserId = parse_id("user", &user_id)?;

    let response = state
        .services
        .memberships
        .update_membership(&user, user_id, request)
        .await?;
    ok(response)
}

/// Extend a membership by whole periods from its current expiry (or today if already lapsed).
#[utoipa::path(
    post,
    path = "/memberships/{user_id}/renew",
    tag = "memberships",
    params(("user_id" = UserId, Path, description = "Member's user id")),
    request_body = RenewMembershipRequest,
    responses(
        (status = 200, description = "Renewed membership", body = MembershipResponse),
        (status = 400, description = "Cancelled memberships cannot be renewed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn renew_membership(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<String>,
    ValidatedJson(request): ValidatedJson<RenewMembershipRequest>,
) -> ApiResult<MembershipResponse> {
    debug!("Renew membership request for user: {}", user_id);

    let user_id: UserId = parse_id("user", &user_id)?;
    let response = state
        .services
        .memberships
        .renew_membership(&user, user_id, request)
        .await?;
    ok(response)
}

/// Flag every overdue active membership as expired.
#[utoipa::path(
    post,
    path = "/memberships/expire",
    tag = "memberships",
    responses((status = 200, description = "Number of memberships expired", body = ExpireMembershipsResponse)),
    security(("bearer_auth" = []))
)]
pub async fn expire_memberships(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<ExpireMembershipsResponse> {
    let response = state.services.memberships.expire_overdue(&user).await?;
    ok(response)
}
