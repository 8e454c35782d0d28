//! Attendance controller.

use super::parse_id;
use crate::{
    extractors::{AuthenticatedUser, ValidatedJson},
    responses::{ok, ApiResponse, ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use gymdesk_core::{ClassId, GymdeskError};
use gymdesk_service::{AttendanceResponse, BulkAttendanceRequest, BulkAttendanceResponse, MarkAttendanceRequest};
use serde::Deserialize;
use tracing::debug;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceDateQuery {
    /// Day of the roll, `YYYY-MM-DD`.
    pub date: Option<NaiveDate>,
}

/// Routes under `/attendance`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(mark_attendance))
        .route("/bulk", post(mark_bulk_attendance))
}

/// Routes nested under `/classes`.
pub fn class_router() -> Router<AppState> {
    Router::new().route("/:id/attendance", get(class_attendance))
}

/// Mark one member present, late or absent for a class day.
///
/// A first mark answers 201; marking the same day again overwrites the
/// status and answers 200.
#[utoipa::path(
    post,
    path = "/attendance",
    tag = "attendance",
    request_body = MarkAttendanceRequest,
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceResponse),
        (status = 200, description = "Existing mark updated", body = AttendanceResponse),
        (status = 400, description = "Date in the future, too old, or before the class started"),
        (status = 404, description = "The member is not enrolled in the class")
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_attendance(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<MarkAttendanceRequest>,
) -> Result<Response, AppError> {
    debug!(
        "Mark attendance request: class {} member {} on {}",
        request.class_id, request.member_id, request.date
    );

    let marked = state.services.attendance.mark(&user, request).await?;
    let status = if marked.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ApiResponse::success(marked.attendance))).into_response())
}

/// Mark a whole class roll; every record is written and reported on its own.
#[utoipa::path(
    post,
    path = "/attendance/bulk",
    tag = "attendance",
    request_body = BulkAttendanceRequest,
    responses(
        (status = 200, description = "Per-member outcomes", body = BulkAttendanceResponse),
        (status = 400, description = "Empty or oversized roll")
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_bulk_attendance(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<BulkAttendanceRequest>,
) -> ApiResult<BulkAttendanceResponse> {
    debug!(
        "Bulk attendance request: class {} on {} ({} records)",
        request.class_id,
        request.date,
        request.records.len()
    );

    let response = state.services.attendance.mark_bulk(&user, request).await?;
    ok(response)
}

/// The roll of a class on one day (trainer or admin).
#[utoipa::path(
    get,
    path = "/classes/{id}/attendance",
    tag = "attendance",
    params(("id" = ClassId, Path, description = "Class id"), AttendanceDateQuery),
    responses(
        (status = 200, description = "Attendance marks", body = [AttendanceResponse]),
        (status = 400, description = "Missing date")
    ),
    security(("bearer_auth" = []))
)]
pub async fn class_attendance(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Query(query): Query<AttendanceDateQuery>,
) -> ApiResult<Vec<AttendanceResponse>> {
    let class_id: ClassId = parse_id("class", &id)?;
    let date = query
        .date
        .ok_or_else(|| GymdeskError::validation("Query parameter 'date' is required"))?;

    let response = state.services.attendance.class_attendance(&user, class_id, date).await?;
    ok(response)
}
