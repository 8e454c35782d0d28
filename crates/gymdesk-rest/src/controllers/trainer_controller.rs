//! Trainer controller.

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
use gymdesk_core::TrainerId;
use gymdesk_service::{ClassResponse, CreateTrainerRequest, PageResponse, TrainerResponse, UpdateTrainerRequest};
use serde::Deserialize;
use tracing::debug;
use utoipa::IntoParams;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrainerListQuery {
    /// Matches name or specialization.
    pub search: Option<String>,
}

/// Creates the trainer router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trainers).post(create_trainer))
        .route("/:id", get(get_trainer).put(update_trainer).delete(delete_trainer))
        .route("/:id/classes", get(list_trainer_classes))
}

#[utoipa::path(
    get,
    path = "/trainers",
    tag = "trainers",
    params(TrainerListQuery, PaginationQuery),
    responses((status = 200, description = "A page of trainers", body = PageResponse<TrainerResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_trainers(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<TrainerListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<PageResponse<TrainerResponse>> {
    let response = state
        .services
        .trainers
        .list_trainers(&user, query.search, pagination.into())
        .await?;
    ok(response)
}

/// Create a trainer account and profile in one step (admin only).
#[utoipa::path(
    post,
    path = "/trainers",
    tag = "trainers",
    request_body = CreateTrainerRequest,
    responses(
        (status = 201, description = "Trainer created", body = TrainerResponse),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_trainer(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateTrainerRequest>,
) -> CreatedResult<TrainerResponse> {
    debug!("Create trainer request: {}", request.email);

    let response = state.services.trainers.create_trainer(&user, request).await?;
    created(response)
}

#[utoipa::path(
    get,
    path = "/trainers/{id}",
    tag = "trainers",
    params(("id" = TrainerId, Path, description = "Trainer id")),
    responses(
        (status = 200, description = "The trainer", body = TrainerResponse),
        (status = 404, description = "No such trainer")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_trainer(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<TrainerResponse> {
    let trainer_id: TrainerId = parse_id("trainer", &id)?;

    let response = state.services.trainers.get_trainer(&user, trainer_id).await?;
    ok(response)
}

/// Update a trainer (admin or the trainer themself).
#[utoipa::path(
    put,
    path = "/trainers/{id}",
    tag = "trainers",
    params(("id" = TrainerId, Path, description = "Trainer id")),
    request_body = UpdateTrainerRequest,
    responses(
        (status = 200, description = "Updated trainer", body = TrainerResponse),
        (status = 403, description = "Not this trainer")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_trainer(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateTrainerRequest>,
) -> ApiResult<TrainerResponse> {
    debug!("Update trainer request: {}", id);

    let trainer_id: TrainerId = parse_id("trainer", &id)?;
    let response = state.services.trainers.update_trainer(&user, trainer_id, request).await?;
    ok(response)
}

/// Delete a trainer with their classes (admin only).
#[utoipa::path(
    delete,
    path = "/trainers/{id}",
    tag = "trainers",
    params(("id" = TrainerId, Path, description = "Trainer id")),
    responses(
        (status = 204, description = "Trainer deleted"),
        (status = 404, description = "No such trainer")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_trainer(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    debug!("Delete trainer request: {}", id);

    let trainer_id: TrainerId = parse_id("trainer", &id)?;
    state.services.trainers.delete_trainer(&user, trainer_id).await?;
    Ok(no_content())
}

/// Classes held by a trainer.
#[utoipa::path(
    get,
    path = "/trainers/{id}/classes",
    tag = "trainers",
    params(("id" = TrainerId, Path, description = "Trainer id"), PaginationQuery),
    responses((status = 200, description = "A page of classes", body = PageResponse<ClassResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_trainer_classes(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<PageResponse<ClassResponse>> {
    let trainer_id: TrainerId = parse_id("trainer", &id)?;

    let response = state
        .services
        .classes
        .list_trainer_classes(&user, trainer_id, pagination.into())
        .await?;
    ok(response)
}
