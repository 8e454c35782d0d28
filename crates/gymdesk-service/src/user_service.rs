//! User service trait definition.

use crate::dto::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::mappers::PageResponse;
use async_trait::async_trait;
use gymdesk_core::{GymdeskResult, PageRequest, UserId};
use gymdesk_repository::UserFilter;
use gymdesk_security::Principal;

/// User service trait.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Creates a user of any role (admin only).
    async fn create_user(&self, principal: &Principal, request: CreateUserRequest) -> GymdeskResult<UserResponse>;

    /// Gets a user by ID (self or admin).
    async fn get_user(&self, principal: &Principal, id: UserId) -> GymdeskResult<UserResponse>;

    /// Lists users with optional role and search filters (admin only).
    async fn list_users(
        &self,
        principal: &Principal,
        filter: UserFilter,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<UserResponse>>;

    /// Updates a user (self or admin; role and status are admin-only).
    async fn update_user(
        &self,
        principal: &Principal,
        id: UserId,
        request: UpdateUserRequest,
    ) -> GymdeskResult<UserResponse>;

    /// Deletes a user and everything that depends on them (admin only, never self).
    async fn delete_user(&self, principal: &Principal, id: UserId) -> GymdeskResult<()>;
}
