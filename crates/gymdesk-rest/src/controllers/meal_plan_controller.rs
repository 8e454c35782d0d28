//! Meal plan controller.

use super::parse_id;
use super::workout_plan_controller::PlanListQuery;
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
use gymdesk_core::MealPlanId;
use gymdesk_service::{CreateMealPlanRequest, MealPlanResponse, PageResponse, UpdateMealPlanRequest};
use tracing::debug;

/// Creates the meal plan router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_meal_plans).post(create_meal_plan))
        .route("/:id", get(get_meal_plan).put(update_meal_plan).delete(delete_meal_plan))
}

/// Create a meal plan (trainer or admin).
#[utoipa::path(
    post,
    path = "/meal-plans",
    tag = "plans",
    request_body = CreateMealPlanRequest,
    responses(
        (status = 201, description = "Plan created", body = MealPlanResponse),
        (status = 400, description = "Calories outside 800-6000, no meals, or the target is not a member")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_meal_plan(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateMealPlanRequest>,
) -> CreatedResult<MealPlanResponse> {
    debug!("Create meal plan request for member: {}", request.member_id);

    let response = state.services.meal_plans.create_plan(&user, request).await?;
    created(response)
}

#[utoipa::path(
    get,
    path = "/meal-plans",
    tag = "plans",
    params(PlanListQuery, PaginationQuery),
    responses((status = 200, description = "A page of meal plans", body = PageResponse<MealPlanResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_meal_plans(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<PlanListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<PageResponse<MealPlanResponse>> {
    let response = state
        .services
        .meal_plans
        .list_plans(&user, query.into(), pagination.into())
        .await?;
    ok(response)
}

#[utoipa::path(
    get,
    path = "/meal-plans/{id}",
    tag = "plans",
    params(("id" = MealPlanId, Path, description = "Meal plan id")),
    responses(
        (status = 200, description = "The plan", body = MealPlanResponse),
        (status = 404, description = "No such plan")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_meal_plan(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<MealPlanResponse> {
    let plan_id: MealPlanId = parse_id("meal plan", &id)?;

    let response = state.services.meal_plans.get_plan(&user, plan_id).await?;
    ok(response)
}

#[utoipa::path(
    put,
    path = "/meal-plans/{id}",
    tag = "plans",
    params(("id" = MealPlanId, Path, description = "Meal plan id")),
    request_body = UpdateMealPlanRequest,
    responses((status = 200, description = "Updated plan", body = MealPlanResponse)),
    security(("bearer_auth" = []))
)]
pub async fn update_meal_plan(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateMealPlanRequest>,
) -> ApiResult<MealPlanResponse> {
    let plan_id: MealPlanId = parse_id("meal plan", &id)?;

    let response = state.services.meal_plans.update_plan(&user, plan_id, request).await?;
    ok(response)
}

#[utoipa::path(
    delete,
    path = "/meal-plans/{id}",
    tag = "plans",
    params(("id" = MealPlanId, Path, description = "Meal plan id")),
    responses(
        (status = 204, description = "Plan deleted"),
        (status = 404, description = "No such plan")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_meal_plan(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let plan_id: MealPlanId = parse_id("meal plan", &id)?;

    state.services.meal_plans.delete_plan(&user, plan_id).await?;
    Ok(no_content())
}
