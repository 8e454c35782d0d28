//! User management controller.

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
use gymdesk_core::{UserId, UserRole};
use gymdesk_repository::UserFilter;
use gymdesk_service::{CreateUserRequest, PageResponse, UpdateUserRequest, UserResponse};
use serde::Deserialize;
use tracing::debug;
use utoipa::IntoParams;

/// Filters for `GET /users`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
    /// Matches first name, last name or email.
    pub search: Option<String>,
}

/// Creates the user router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

/// List users (admin only).
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(UserListQuery, PaginationQuery),
    responses(
        (status = 200, description = "A page of users", body = PageResponse<UserResponse>),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<UserListQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<PageResponse<UserResponse>> {
    debug!("List users request");

    let filter = UserFilter {
        role: query.role,
        search: query.search,
    };
    let response = state.services.users.list_users(&user, filter, pagination.into()).await?;
    ok(response)
}

/// Create a user of any role (admin only).
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> CreatedResult<UserResponse> {
    debug!("Create user request: {}", request.email);

    let response = state.services.users.create_user(&user, request).await?;
    created(response)
}

/// Get a user (self or admin).
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = UserId, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 404, description = "No such user")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<UserResponse> {
    let user_id: UserId = parse_id("user", &id)?;

    let response = state.services.users.get_user(&user, user_id).await?;
    ok(response)
}

/// Update a user (self or admin; role and status are admin-only).
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(("id" = UserId, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 403, description = "Not allowed to change this user")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<UserResponse> {
    debug!("Update user request: {}", id);

    let user_id: UserId = parse_id("user", &id)?;
    let response = state.services.users.update_user(&user, user_id, request).await?;
    ok(response)
}

/// Delete a user and their dependent records (admin only).
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = UserId, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Admins cannot delete themselves"),
        (status = 404, description = "No such user")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    debug!("Delete user request: {}", id);

    let user_id: UserId = parse_id("user", &id)?;
    state.services.users.delete_user(&user, user_id).await?;
    Ok(no_content())
}
