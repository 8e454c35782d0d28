//! Member-scoped reads (`/members/:id/...`): a member's enrollments,
//! attendance and payments. Members may read their own; staff rules differ
//! per resource and are enforced by the services.

use super::parse_id;
use crate::{
    extractors::{AuthenticatedUser, PaginationQuery},
    responses::{ok, ApiResult},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use gymdesk_core::{AttendanceSummary, ClassId, UserId};
use gymdesk_service::{AttendanceResponse, EnrollmentResponse, PageResponse, PaymentResponse};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClassScopeQuery {
    /// Restrict to one class.
    pub class_id: Option<ClassId>,
}

/// Creates the member router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/enrollments", get(member_enrollments))
        .route("/:id/attendance", get(member_attendance))
        .route("/:id/attendance/summary", get(member_attendance_summary))
        .route("/:id/payments", get(member_payments))
}

#[utoipa::path(
    get,
    path = "/members/{id}/enrollments",
    tag = "members",
    params(("id" = UserId, Path, description = "Member's user id"), PaginationQuery),
    responses((status = 200, description = "A page of enrollments", body = PageResponse<EnrollmentResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn member_enrollments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<PageResponse<EnrollmentResponse>> {
    let member_id: UserId = parse_id("member", &id)?;

    let response = state
        .services
        .enrollments
        .list_member_enrollments(&user, member_id, pagination.into())
        .await?;
    ok(response)
}

#[utoipa::path(
    get,
    path = "/members/{id}/attendance",
    tag = "members",
    params(("id" = UserId, Path, description = "Member's user id"), ClassScopeQuery, PaginationQuery),
    responses((status = 200, description = "A page of attendance marks", body = PageResponse<AttendanceResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn member_attendance(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Query(scope): Query<ClassScopeQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<PageResponse<AttendanceResponse>> {
    let member_id: UserId = parse_id("member", &id)?;

    let response = state
        .services
        .attendance
        .member_attendance(&user, member_id, scope.class_id, pagination.into())
        .await?;
    ok(response)
}

/// Attendance totals; late counts as attended in the percentage.
#[utoipa::path(
    get,
    path = "/members/{id}/attendance/summary",
    tag = "members",
    params(("id" = UserId, Path, description = "Member's user id"), ClassScopeQuery),
    responses((status = 200, description = "Attendance totals", body = AttendanceSummary)),
    security(("bearer_auth" = []))
)]
pub async fn member_attendance_summary(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Query(scope): Query<ClassScopeQuery>,
) -> ApiResult<AttendanceSummary> {
    let member_id: UserId = parse_id("member", &id)?;

    let response = state
        .services
        .attendance
        .member_summary(&user, member_id, scope.class_id)
        .await?;
    ok(response)
}

#[utoipa::path(
    get,
    path = "/members/{id}/payments",
    tag = "members",
    params(("id" = UserId, Path, description = "Member's user id"), PaginationQuery),
    responses((status = 200, description = "A page of payments", body = PageResponse<PaymentResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn member_payments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<PageResponse<PaymentResponse>> {
    let member_id: UserId = parse_id("member", &id)?;

    let response = state
        .services
        .payments
        .list_member_payments(&user, member_id, pagination.into())
        .await?;
    ok(response)
}
