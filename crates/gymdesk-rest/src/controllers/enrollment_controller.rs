//! Class enrollment controller (`/classes/:id/enrollments`).

use super::parse_id;
use crate::{
    extractors::{AuthenticatedUser, PaginationQuery},
    responses::{created, no_content, ok, ApiResult, AppError, CreatedResult},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use gymdesk_core::{ClassId, UserId};
use gymdesk_service::{EnrollRequest, EnrollmentResponse, PageResponse};
use tracing::debug;

/// Routes nested under `/classes`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/enrollments", get(list_class_enrollments).post(enroll))
        .route("/:id/enrollments/:member_id", delete(unenroll))
}

/// Enroll a member in a class.
///
/// Members always enroll themselves and the body may be empty; trainers and
/// admins name the member.
#[utoipa::path(
    post,
    path = "/classes/{id}/enrollments",
    tag = "enrollments",
    params(("id" = ClassId, Path, description = "Class id")),
    request_body = EnrollRequest,
    responses(
        (status = 201, description = "Enrolled", body = EnrollmentResponse),
        (status = 400, description = "Not a member, or no active membership"),
        (status = 404, description = "No such class"),
        (status = 409, description = "Already enrolled, or the class is full")
    ),
    security(("bearer_auth" = []))
)]
pub async fn enroll(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    request: Option<Json<EnrollRequest>>,
) -> CreatedResult<EnrollmentResponse> {
    let class_id: ClassId = parse_id("class", &id)?;
    let request = request.map(|Json(r)| r).unwrap_or_default();
    debug!("Enroll request for class {} by {}", class_id, user.user_id);

    let response = state.services.enrollments.enroll(&user, class_id, request).await?;
    created(response)
}

/// Remove an enrollment and its attendance (the member or staff).
#[utoipa::path(
    delete,
    path = "/classes/{id}/enrollments/{member_id}",
    tag = "enrollments",
    params(
        ("id" = ClassId, Path, description = "Class id"),
        ("member_id" = UserId, Path, description = "Member's user id")
    ),
    responses(
        (status = 204, description = "Unenrolled"),
        (status = 404, description = "Not enrolled")
    ),
    security(("bearer_auth" = []))
)]
pub async fn unenroll(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, member_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let class_id: ClassId = parse_id("class", &id)?;
    let member_id: UserId = parse_id("member", &member_id)?;

    state.services.enrollments.unenroll(&user, class_id, member_id).await?;
    Ok(no_content())
}

/// Enrollments of a class (trainer or admin).
#[utoipa::path(
    get,
    path = "/classes/{id}/enrollments",
    tag = "enrollments",
    params(("id" = ClassId, Path, description = "Class id"), PaginationQuery),
    responses((status = 200, description = "A page of enrollments", body = PageResponse<EnrollmentResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_class_enrollments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<PageResponse<EnrollmentResponse>> {
    let class_id: ClassId = parse_id("class", &id)?;

    let response = state
        .services
        .enrollments
        .list_class_enrollments(&user, class_id, pagination.into())
        .await?;
    ok(response)
}
