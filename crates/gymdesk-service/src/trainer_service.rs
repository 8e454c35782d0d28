//! Trainer service: trainer accounts with their profiles.

use crate::dto::{CreateTrainerRequest, TrainerResponse, UpdateTrainerRequest};
use crate::mappers::PageResponse;
use crate::support::parse_email;
use async_trait::async_trait;
use gymdesk_core::{
    GymdeskError, GymdeskResult, PageRequest, Trainer, TrainerId, TrainerProfile, UserBuilder, UserRole, ValidateExt,
};
use gymdesk_repository::{TrainerRepository, UserRepository};
use gymdesk_security::{ClaimsExt, PasswordHasher, Principal};
use std::sync::Arc;
use tracing::{debug, info};

/// Trainer service trait.
#[async_trait]
pub trait TrainerService: Send + Sync {
    /// Creates a trainer account and profile (admin only).
    async fn create_trainer(&self, principal: &Principal, request: CreateTrainerRequest) -> GymdeskResult<TrainerResponse>;

    async fn get_trainer(&self, principal: &Principal, id: TrainerId) -> GymdeskResult<TrainerResponse>;

    async fn list_trainers(
        &self,
        principal: &Principal,
        search: Option<String>,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<TrainerResponse>>;

    /// Updates a trainer (admin or the trainer themself).
    async fn update_trainer(
        &self,
        principal: &Principal,
        id: TrainerId,
        request: UpdateTrainerRequest,
    ) -> GymdeskResult<TrainerResponse>;

    /// Deletes a trainer with their classes (admin only).
    async fn delete_trainer(&self, principal: &Principal, id: TrainerId) -> GymdeskResult<()>;
}

/// Trainer service implementation.
pub struct TrainerServiceImpl {
    trainer_repository: Arc<dyn TrainerRepository>,
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<PasswordHasher>,
}

impl TrainerServiceImpl {
    pub fn new(
        trainer_repository: Arc<dyn TrainerRepository>,
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<PasswordHasher>,
    ) -> Self {
        Self {
            trainer_repository,
            user_repository,
            password_hasher,
        }
    }

    async fn load(&self, id: TrainerId) -> GymdeskResult<TrainerProfile> {
        self.trainer_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| GymdeskError::not_found("Trainer", id))
    }
}

#[async_trait]
impl TrainerService for TrainerServiceImpl {
    async fn create_trainer(&self, principal: &Principal, request: CreateTrainerRequest) -> GymdeskResult<TrainerResponse> {
        debug!("Creating trainer: {}", request.email);

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
            .role(UserRole::Trainer)
            .phone(request.phone)
            .build()?;

        let mut trainer = Trainer::new(user.id, request.specialization.trim().to_string(), request.experience_years);
        trainer.certification = request.certification;
        trainer.bio = request.bio;
        trainer.hourly_rate_cents = request.hourly_rate_cents;

        let profile = self.trainer_repository.create(&TrainerProfile { trainer, user }).await?;

        info!("Trainer created: {} (user {})", profile.trainer.id, profile.user.id);
        Ok(TrainerResponse::from(profile))
    }

    async fn get_trainer(&self, _principal: &Principal, id: TrainerId) -> GymdeskResult<TrainerResponse> {
        debug!("Getting trainer: {}", id);

        Ok(TrainerResponse::from(self.load(id).await?))
    }

    async fn list_trainers(
        &self,
        _principal: &Principal,
        search: Option<String>,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<TrainerResponse>> {
        debug!("Listing trainers, page: {}, size: {}", page.page, page.size);

        let search = search.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let trainers = self.trainer_repository.find_all(search, page).await?;
        Ok(PageResponse::from_page(trainers, TrainerResponse::from))
    }

    async fn update_trainer(
        &self,
        principal: &Principal,
        id: TrainerId,
        request: UpdateTrainerRequest,
    ) -> GymdeskResult<TrainerResponse> {
        debug!("Updating trainer: {}", id);

        request.validate_request()?;

        let mut profile = self.load(id).await?;
        principal.require_role_or_owner(UserRole::Admin, profile.user.id)?;

        let TrainerProfile { trainer, user } = &mut profile;
        if let Some(first_name) = request.first_name {
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = request.last_name {
            user.last_name = last_name.trim().to_string();
        }
        if request.phone.is_some() {
            user.phone = request.phone;
        }
        if let Some(specialization) = request.specialization {
            trainer.specialization = specialization.trim().to_string();
        }
        if let Some(years) = request.experience_years {
            trainer.experience_years = years;
        }
        if request.certification.is_some() {
            trainer.certification = request.certification;
        }
        if request.bio.is_some() {
            trainer.bio = request.bio;
        }
        if request.hourly_rate_cents.is_some() {
            trainer.hourly_rate_cents = request.hourly_rate_cents;
        }
        trainer.touch();
        user.updated_at = trainer.updated_at;

        let updated = self.trainer_repository.update(&profile).await?;

        info!("Trainer updated: {}", id);
        Ok(TrainerResponse::from(updated))
    }

    async fn delete_trainer(&self, principal: &Principal, id: TrainerId) -> GymdeskResult<()> {
        debug!("Deleting trainer: {}", id);

        principal.require_admin()?;

        if !self.trainer_repository.delete(id).await? {
            return Err(GymdeskError::not_found("Trainer", id));
        }

        info!("Trainer deleted: {}", id);
        Ok(())
    }
}

impl std::fmt::Debug for TrainerServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainerServiceImpl").finish_non_exhaustive()
    }
}
