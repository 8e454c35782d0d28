//! Class scheduling controller.

use super::parse_id;
use crate::{
    extractors::{AuthenticatedUser, PaginationQuery, ValidatedJson},
    responses::{created, no_content, ok, ApiResult, AppError, CreatedResult},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use gymdesk_core::{ClassId, TrainerId};
use gymdesk_repository::ClassFilter;
use gymdesk_service::{ClassResponse, CreateClassRequest, PageResponse, UpdateClassRequest};
use serde::Deserialize;
use tracing::debug;
use utoipa::IntoParams;

/// Filters for `GET /classes`; results are ordered by start time.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClassListQuery {
    pub trainer_id: Option<TrainerId>,
    /// Matches name or location.
    pub search: Option<String>,
    /// Classes starting at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Classes starting before this instant.
    pub to: Option<DateTime<Utc>>,
}

impl From<ClassListQuery> for ClassFilter {
    fn from(query: ClassListQuery) -> Self {
        Self {
            trainer_id: query.trainer_id,
            search: query.search,
            from: query.from,
            to: query.to,
        }
    }
}

/// Creates the class router. Enrollment and attendance routes under
/// `/classes/:id/...` are merged in by the main router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_classes).post(create_class))
        .route("/:id", get(get_class).put(update_class).delete(delete_class))
}

#[utoipa::path(
    get,
    path = "/classes",
    tag = "classes",
    params(ClassListQuery, PaginationQuery),
    responses(
        (status = 200, description = "A page of classes", body = PageResponse<ClassResponse>),
        (status = 400, description = "`to` is before `from`")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_classes(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ClassListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<PageResponse<ClassResponse>> {
    let response = state
        .services
        .classes
        .list_classes(&user, query.into(), pagination.into())
        .await?;
    ok(response)
}

/// Schedule a class (admin only).
#[utoipa::path(
    post,
    path = "/classes",
    tag = "classes",
    request_body = CreateClassRequest,
    responses(
        (status = 201, description = "Class scheduled", body = ClassResponse),
        (status = 404, description = "No such trainer"),
        (status = 409, description = "The trainer already holds an overlapping class")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_class(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateClassRequest>,
) -> CreatedResult<ClassResponse> {
    debug!("Create class request: {}", request.name);

    let response = state.services.classes.create_class(&user, request).await?;
    created(response)
}

/// Get a class with its enrolled count and remaining spots.
#[utoipa::path(
    get,
    path = "/classes/{id}",
    tag = "classes",
    params(("id" = ClassId, Path, description = "Class id")),
    responses(
        (status = 200, description = "The class", body = ClassResponse),
        (status = 404, description = "No such class")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_class(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<ClassResponse> {
    let class_id: ClassId = parse_id("class", &id)?;

    let response = state.services.classes.get_class(&user, class_id).await?;
    ok(response)
}

/// Update a class (admin or the trainer holding it).
#[utoipa::path(
    put,
    path = "/classes/{id}",
    tag = "classes",
    params(("id" = ClassId, Path, description = "Class id")),
    request_body = UpdateClassRequest,
    responses(
        (status = 200, description = "Updated class", body = ClassResponse),
        (status = 400, description = "Capacity below the enrolled count"),
        (status = 409, description = "Overlaps another class of the trainer")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_class(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateClassRequest>,
) -> ApiResult<ClassResponse> {
    debug!("Update class request: {}", id);

    let class_id: ClassId = parse_id("class", &id)?;
    let response = state.services.classes.update_class(&user, class_id, request).await?;
    ok(response)
}

/// Delete a class with its enrollments and attendance (admin only).
#[utoipa::path(
    delete,
    path = "/classes/{id}",
    tag = "classes",
    params(("id" = ClassId, Path, description = "Class id")),
    responses(
        (status = 204, description = "Class deleted"),
        (status = 404, description = "No such class")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_class(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    debug!("Delete class request: {}", id);

    let class_id: ClassId = parse_id("class", &id)?;
    state.services.classes.delete_class(&user, class_id).await?;
    Ok(no_content())
}
