//! User service implementation.

use crate::dto::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::mappers::PageResponse;
use crate::support::{load_user, parse_email};
use crate::user_service::UserService;
use async_trait::async_trait;
use gymdesk_core::{GymdeskError, GymdeskResult, PageRequest, Trainer, TrainerProfile, UserBuilder, UserId, UserRole, ValidateExt};
use gymdesk_repository::{TrainerRepository, UserFilter, UserRepository};
use gymdesk_security::{guards, ClaimsExt, PasswordHasher, Principal};
use std::sync::Arc;
use tracing::{debug, info};

/// User service implementation.
pub struct UserServiceImpl {
    user_repository: Arc<dyn UserRepository>,
    trainer_repository: Arc<dyn TrainerRepository>,
    password_hasher: Arc<PasswordHasher>,
}

impl UserServiceImpl {
    /// Creates a new user service.
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        trainer_repository: Arc<dyn TrainerRepository>,
        password_hasher: Arc<PasswordHasher>,
    ) -> Self {
        Self {
            user_repository,
            trainer_repository,
            password_hasher,
        }
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn create_user(&self, principal: &Principal, request: CreateUserRequest) -> GymdeskResult<UserResponse> {
        debug!("Creating {} user: {}", request.role, request.email);

        principal.require_admin()?;
        request.validate_request()?;

        let email = parse_email(&request.email)?;
        if self.user_repository.exists_by_email(email.as_str()).await? {
            return Err(GymdeskError::Conflict(format!("Email '{email}' is already registered")));
        }

        let user = UserBuilder::new()
            .first_name(request.first_name.trim())
            .last_name(request.last_name.trim())
            .email(email)
            .password_hash(self.password_hasher.hash(&request.password)?)
            .role(request.role)
            .phone(request.phone)
            .date_of_birth(request.date_of_birth)
            .build()?;

        // Trainer accounts always come with a profile so they can hold classes.
        let saved_user = if user.role == UserRole::Trainer {
            let profile = TrainerProfile {
                trainer: Trainer::new(user.id, "General fitness".to_string(), 0),
                user,
            };
            self.trainer_repository.create(&profile).await?.user
        } else {
            self.user_repository.save(&user).await?
        };

        info!("User created: {} ({})", saved_user.id, saved_user.role);
        Ok(UserResponse::from(saved_user))
    }

    async fn get_user(&self, principal: &Principal, id: UserId) -> GymdeskResult<UserResponse> {
        debug!("Getting user: {}", id);

        guards::owner_or_admin().check(principal, Some(id))?;

        let user = load_user(self.user_repository.as_ref(), id).await?;
        Ok(UserResponse::from(user))
    }

    async fn list_users(
        &self,
        principal: &Principal,
        filter: UserFilter,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<UserResponse>> {
        debug!("Listing users, page: {}, size: {}", page.page, page.size);

        principal.require_admin()?;

        let users = self.user_repository.find_all(&filter, page).await?;
        Ok(PageResponse::from_page(users, UserResponse::from))
    }

    async fn update_user(
        &self,
        principal: &Principal,
        id: UserId,
        request: UpdateUserRequest,
    ) -> GymdeskResult<UserResponse> {
        debug!("Updating user: {}", id);

        guards::owner_or_admin().check(principal, Some(id))?;
        if request.changes_access() {
            principal.require_admin()?;
        }
        request.validate_request()?;

        let mut user = load_user(self.user_repository.as_ref(), id).await?;

        if let Some(raw) = request.email.as_deref() {
            let email = parse_email(raw)?;
            if email != user.email && self.user_repository.exists_by_email(email.as_str()).await? {
                return Err(GymdeskError::Conflict(format!("Email '{email}' is already registered")));
            }
            user.email = email;
        }
        if let Some(role) = request.role {
            if role != user.role && (user.role == UserRole::Trainer || role == UserRole::Trainer) {
                return Err(GymdeskError::business_rule(
                    "trainer accounts are managed through the trainer endpoints",
                ));
            }
            user.change_role(role);
        }
        if let Some(status) = request.status {
            if id == principal.user_id {
                return Err(GymdeskError::business_rule("you cannot change your own status"));
            }
            user.change_status(status);
        }
        if let Some(first_name) = request.first_name {
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = request.last_name {
            user.last_name = last_name.trim().to_string();
        }
        if request.phone.is_some() {
            user.phone = request.phone;
        }
        if request.date_of_birth.is_some() {
            user.date_of_birth = request.date_of_birth;
        }

        let updated_user = self.user_repository.update(&user).await?;

        info!("User updated: {}", id);
        Ok(UserResponse::from(updated_user))
    }

    async fn delete_user(&self, principal: &Principal, id: UserId) -> GymdeskResult<()> {
        debug!("Deleting user: {}", id);

        principal.require_admin()?;
        if id == principal.user_id {
            return Err(GymdeskError::business_rule("you cannot delete your own account"));
        }

        let deleted = match self.trainer_repository.find_by_user_id(id).await? {
            Some(profile) => self.trainer_repository.delete(profile.trainer.id).await?,
            None => self.user_repository.delete(id).await?,
        };
        if !deleted {
            return Err(GymdeskError::not_found("User", id));
        }

        info!("User deleted: {}", id);
        Ok(())
    }
}

impl std::fmt::Debug for UserServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserServiceImpl").finish_non_exhaustive()
    }
}
