//! Workout plan controller.

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
use gymdesk_core::{TrainerId, UserId, WorkoutPlanId};
use gymdesk_repository::PlanFilter;
use gymdesk_service::{CreateWorkoutPlanRequest, PageResponse, UpdateWorkoutPlanRequest, WorkoutPlanResponse};
use serde::Deserialize;
use tracing::debug;
use utoipa::IntoParams;

/// Filters for plan listings. Members only ever see their own plans.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PlanListQuery {
    pub member_id: Option<UserId>,
    pub trainer_id: Option<TrainerId>,
}

impl From<PlanListQuery> for PlanFilter {
    fn from(query: PlanListQuery) -> Self {
        Self {
            member_id: query.member_id,
            trainer_id: query.trainer_id,
        }
    }
}

/// Creates the workout plan router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_workout_plans).post(create_workout_plan))
        .route(
            "/:id",
            get(get_workout_plan).put(update_workout_plan).delete(delete_workout_plan),
        )
}

/// Create a workout plan (trainer or admin). A trainer becomes the plan's author.
#[utoipa::path(
    post,
    path = "/workout-plans",
    tag = "plans",
    request_body = CreateWorkoutPlanRequest,
    responses(
        (status = 201, description = "Plan created", body = WorkoutPlanResponse),
        (status = 400, description = "Invalid plan, or the target is not a member")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_workout_plan(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateWorkoutPlanRequest>,
) -> CreatedResult<WorkoutPlanResponse> {
    debug!("Create workout plan request for member: {}", request.member_id);

    let response = state.services.workout_plans.create_plan(&user, request).await?;
    created(response)
}

#[utoipa::path(
    get,
    path = "/workout-plans",
    tag = "plans",
    params(PlanListQuery, PaginationQuery),
    responses((status = 200, description = "A page of workout plans", body = PageResponse<WorkoutPlanResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_workout_plans(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<PlanListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<PageResponse<WorkoutPlanResponse>> {
    let response = state
        .services
        .workout_plans
        .list_plans(&user, query.into(), pagination.into())
        .await?;
    ok(response)
}

#[utoipa::path(
    get,
    path = "/workout-plans/{id}",
    tag = "plans",
    params(("id" = WorkoutPlanId, Path, description = "Workout plan id")),
    responses(
        (status = 200, description = "The plan", body = WorkoutPlanResponse),
        (status = 404, description = "No such plan")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_workout_plan(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<WorkoutPlanResponse> {
    let plan_id: WorkoutPlanId = parse_id("workout plan", &id)?;

    let response = state.services.workout_plans.get_plan(&user, plan_id).await?;
    ok(response)
}

#[utoipa::path(
    put,
    path = "/workout-plans/{id}",
    tag = "plans",
    params(("id" = WorkoutPlanId, Path, description = "Workout plan id")),
    request_body = UpdateWorkoutPlanRequest,
    responses((status = 200, description = "Updated plan", body = WorkoutPlanResponse)),
    security(("bearer_auth" = []))
)]
pub async fn update_workout_plan(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateWorkoutPlanRequest>,
) -> ApiResult<WorkoutPlanResponse> {
    let plan_id: WorkoutPlanId = parse_id("workout plan", &id)?;

    let response = state
        .services
        .workout_plans
        .update_plan(&user, plan_id, request)
        .await?;
    ok(response)
}

#[utoipa::path(
    delete,
    path = "/workout-plans/{id}",
    tag = "plans",
    params(("id" = WorkoutPlanId, Path, description = "Workout plan id")),
    responses(
        (status = 204, description = "Plan deleted"),
        (status = 404, description = "No such plan")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_workout_plan(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let plan_id: WorkoutPlanId = parse_id("workout plan", &id)?;

    state.services.workout_plans.delete_plan(&user, plan_id).await?;
    Ok(no_content())
}
