//! Class service trait definition.

use crate::dto::{ClassResponse, CreateClassRequest, UpdateClassRequest};
use crate::mappers::PageResponse;
use async_trait::async_trait;
use gymdesk_core::{ClassId, GymdeskResult, PageRequest, TrainerId};
use gymdesk_repository::ClassFilter;
use gymdesk_security::Principal;

/// Class scheduling service.
#[async_trait]
pub trait ClassService: Send + Sync {
    /// Schedules a class (admin only).
    async fn create_class(&self, principal: &Principal, request: CreateClassRequest) -> GymdeskResult<ClassResponse>;

    async fn get_class(&self, principal: &Principal, id: ClassId) -> GymdeskResult<ClassResponse>;

    async fn list_classes(
        &self,
        principal: &Principal,
        filter: ClassFilter,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<ClassResponse>>;

    /// Classes held by one trainer.
    async fn list_trainer_classes(
        &self,
        principal: &Principal,
        trainer_id: TrainerId,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<ClassResponse>>;

    /// Updates a class (admin or the trainer holding it).
    async fn update_class(
        &self,
        principal: &Principal,
        id: ClassId,
        request: UpdateClassRequest,
    ) -> GymdeskResult<ClassResponse>;

    /// Deletes a class with its enrollments and attendance (admin only).
    async fn delete_class(&self, principal: &Principal, id: ClassId) -> GymdeskResult<()>;
}
