//! Class service implementation.

use crate::class_service::ClassService;
use crate::dto::{ClassResponse, CreateClassRequest, UpdateClassRequest};
use crate::mappers::PageResponse;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gymdesk_core::{
    ClassId, ClassUpdateOutcome, GymClass, GymdeskError, GymdeskResult, Page, PageRequest, TrainerId, ValidateExt,
};
use gymdesk_repository::{ClassFilter, ClassRepository, TrainerRepository};
use gymdesk_security::{ClaimsExt, Principal};
use std::sync::Arc;
use tracing::{debug, info};

fn trainer_busy() -> GymdeskError {
    GymdeskError::Conflict("Trainer already holds a class overlapping this time".to_string())
}

/// Class service implementation.
pub struct ClassServiceImpl {
    class_repository: Arc<dyn ClassRepository>,
    trainer_repository: Arc<dyn TrainerRepository>,
}

impl ClassServiceImpl {
    pub fn new(class_repository: Arc<dyn ClassRepository>, trainer_repository: Arc<dyn TrainerRepository>) -> Self {
        Self {
            class_repository,
            trainer_repository,
        }
    }

    async fn load(&self, id: ClassId) -> GymdeskResult<GymClass> {
        self.class_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| GymdeskError::not_found("Class", id))
    }

    async fn ensure_trainer_exists(&self, id: TrainerId) -> GymdeskResult<()> {
        if self.trainer_repository.find_by_id(id).await?.is_none() {
            return Err(GymdeskError::not_found("Trainer", id));
        }
        Ok(())
    }

    async fn ensure_free_slot(
        &self,
        trainer_id: TrainerId,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        exclude: Option<ClassId>,
    ) -> GymdeskResult<()> {
        if self
            .class_repository
            .has_overlap(trainer_id, starts_at, ends_at, exclude)
            .await?
        {
            return Err(trainer_busy());
        }
        Ok(())
    }

    /// Admins may edit any class; trainers only the classes they hold.
    async fn authorize_edit(&self, principal: &Principal, class: &GymClass) -> GymdeskResult<()> {
        if principal.is_admin() {
            return Ok(());
        }
        principal.require_staff()?;
        let own = self.trainer_repository.find_by_user_id(principal.user_id).await?;
        match own {
            Some(profile) if profile.trainer.id == class.trainer_id => Ok(()),
            _ => Err(GymdeskError::Forbidden("You can only edit your own classes".to_string())),
        }
    }

    async fn with_counts(&self, classes: Page<GymClass>) -> GymdeskResult<PageResponse<ClassResponse>> {
        let mut counts = Vec::with_capacity(classes.len());
        for class in &classes.content {
            counts.push(self.class_repository.enrolled_count(class.id).await?);
        }
        let mut counts = counts.into_iter();
        Ok(PageResponse::from_page(classes, |class| {
            ClassResponse::with_enrolled(class, counts.next().unwrap_or_default())
        }))
    }
}

#[async_trait]
impl ClassService for ClassServiceImpl {
    async fn create_class(&self, principal: &Principal, request: CreateClassRequest) -> GymdeskResult<ClassResponse> {
        debug!("Creating class: {}", request.name);

        principal.require_admin()?;
        request.validate_request()?;

        let mut class = GymClass::new(
            request.name.trim().to_string(),
            request.trainer_id,
            request.starts_at,
            request.ends_at,
            request.capacity,
        )?;
        class.description = request.description;
        class.location = request.location;

        self.ensure_trainer_exists(class.trainer_id).await?;
        self.ensure_free_slot(class.trainer_id, class.starts_at, class.ends_at, None)
            .await?;

        let saved = self.class_repository.save(&class).await?;

        info!("Class created: {} ({})", saved.id, saved.name);
        Ok(ClassResponse::with_enrolled(saved, 0))
    }

    async fn get_class(&self, _principal: &Principal, id: ClassId) -> GymdeskResult<ClassResponse> {
        debug!("Getting class: {}", id);

        let class = self.load(id).await?;
        let enrolled = self.class_repository.enrolled_count(id).await?;
        Ok(ClassResponse::with_enrolled(class, enrolled))
    }

    async fn list_classes(
        &self,
        _principal: &Principal,
        filter: ClassFilter,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<ClassResponse>> {
        debug!("Listing classes, page: {}, size: {}", page.page, page.size);

        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if to < from {
                return Err(GymdeskError::validation("'to' must not be before 'from'"));
            }
        }

        let classes = self.class_repository.find_all(&filter, page).await?;
        self.with_counts(classes).await
    }

    async fn list_trainer_classes(
        &self,
        _principal: &Principal,
        trainer_id: TrainerId,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<ClassResponse>> {
        debug!("Listing classes of trainer: {}", trainer_id);

        self.ensure_trainer_exists(trainer_id).await?;

        let filter = ClassFilter {
            trainer_id: Some(trainer_id),
            ..ClassFilter::default()
        };
        let classes = self.class_repository.find_all(&filter, page).await?;
        self.with_counts(classes).await
    }

    async fn update_class(
        &self,
        principal: &Principal,
        id: ClassId,
        request: UpdateClassRequest,
    ) -> GymdeskResult<ClassResponse> {
        debug!("Updating class: {}", id);

        request.validate_request()?;

        let mut class = self.load(id).await?;
        self.authorize_edit(principal, &class).await?;

        if let Some(trainer_id) = request.trainer_id.filter(|t| *t != class.trainer_id) {
            principal.require_admin()?;
            self.ensure_trainer_exists(trainer_id).await?;
            class.trainer_id = trainer_id;
        }

        let starts_at = request.starts_at.unwrap_or(class.starts_at);
        let ends_at = request.ends_at.unwrap_or(class.ends_at);
        GymClass::check_window(starts_at, ends_at)?;
        class.starts_at = starts_at;
        class.ends_at = ends_at;

        if let Some(capacity) = request.capacity {
            GymClass::check_capacity(capacity)?;
            class.capacity = capacity;
        }

        if let Some(name) = request.name {
            class.name = name.trim().to_string();
        }
        if request.description.is_some() {
            class.description = request.description;
        }
        if request.location.is_some() {
            class.location = request.location;
        }

        class.touch();
        match self.class_repository.update(&class).await? {
            ClassUpdateOutcome::Updated { class, enrolled } => {
                info!("Class updated: {}", id);
                Ok(ClassResponse::with_enrolled(class, enrolled))
            }
            ClassUpdateOutcome::NotFound => Err(GymdeskError::not_found("Class", id)),
            ClassUpdateOutcome::CapacityBelowEnrolled { enrolled } => Err(GymdeskError::validation(format!(
                "Capacity cannot be lower than the {enrolled} members already enrolled"
            ))),
            ClassUpdateOutcome::TrainerBusy => Err(trainer_busy()),
        }
    }

    async fn delete_class(&self, principal: &Principal, id: ClassId) -> GymdeskResult<()> {
        debug!("Deleting class: {}", id);

        principal.require_admin()?;

        if !self.class_repository.delete(id).await? {
            return Err(GymdeskError::not_found("Class", id));
        }

        info!("Class deleted: {}", id);
        Ok(())
    }
}

impl std::fmt::Debug for ClassServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassServiceImpl").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use chrono::Duration;
    use gymdesk_repository::EnrollmentRepository;

    fn service(fx: &Fixture) -> ClassServiceImpl {
        ClassServiceImpl::new(Arc::clone(&fx.repos.classes), Arc::clone(&fx.repos.trainers))
    }

    fn create_request(trainer_id: TrainerId, starts_in: Duration, minutes: i64) -> CreateClassRequest {
        let starts_at = Fixture::now() + starts_in;
        CreateClassRequest {
            name: "Spin".to_string(),
            description: None,
            trainer_id,
            starts_at,
            ends_at: starts_at + Duration::minutes(minutes),
            capacity: 12,
            location: Some("Studio 2".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_class() {
        let fx = Fixture::new();
        let classes = service(&fx);
        let admin = fx.admin().await;
        let coach = fx.trainer("coach@gym.test").await;

        let created = classes
            .create_class(
                &Fixture::principal(&admin),
                create_request(coach.trainer.id, Duration::days(1), 45),
            )
            .await
            .unwrap();
        assert_eq!(created.enrolled_count, 0);
        assert_eq!(created.remaining_spots, 12);
    }

    #[tokio::test]
    async fn test_create_class_rejects_inverted_window_and_unknown_trainer() {
        let fx = Fixture::new();
        let classes = service(&fx);
        let admin = fx.admin().await;
        let coach = fx.trainer("coach@gym.test").await;

        let err = classes
            .create_class(
                &Fixture::principal(&admin),
                create_request(coach.trainer.id, Duration::days(1), -30),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);

        let err = classes
            .create_class(
                &Fixture::principal(&admin),
                create_request(TrainerId::new(), Duration::days(1), 30),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_overlapping_classes_conflict() {
        let fx = Fixture::new();
        let classes = service(&fx);
        let admin = fx.admin().await;
        let coach = fx.trainer("coach@gym.test").await;
        fx.class(&coach, Duration::days(1), 10).await;

        let err = classes
            .create_class(
                &Fixture::principal(&admin),
                create_request(coach.trainer.id, Duration::days(1) + Duration::minutes(30), 60),
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);

        // Back to back is fine.
        classes
            .create_class(
                &Fixture::principal(&admin),
                create_request(coach.trainer.id, Duration::days(1) + Duration::hours(1), 60),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_owning_trainer_can_update() {
        let fx = Fixture::new();
        let classes = service(&fx);
        let coach = fx.trainer("coach@gym.test").await;
        let other = fx.trainer("other@gym.test").await;
        let class = fx.class(&coach, Duration::days(2), 10).await;

        let request = UpdateClassRequest {
            location: Some("Pool".to_string()),
            ..UpdateClassRequest::default()
        };
        let updated = classes
            .update_class(&Fixture::principal(&coach.user), class.id, request.clone())
            .await
            .unwrap();
        assert_eq!(updated.location.as_deref(), Some("Pool"));

        let err = classes
            .update_class(&Fixture::principal(&other.user), class.id, request)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_trainer_cannot_reassign_class() {
        let fx = Fixture::new();
        let classes = service(&fx);
        let coach = fx.trainer("coach@gym.test").await;
        let other = fx.trainer("other@gym.test").await;
        let class = fx.class(&coach, Duration::days(2), 10).await;

        let request = UpdateClassRequest {
            trainer_id: Some(other.trainer.id),
            ..UpdateClassRequest::default()
        };
        let err = classes
            .update_class(&Fixture::principal(&coach.user), class.id, request)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_capacity_cannot_drop_below_enrolled() {
        let fx = Fixture::new();
        let classes = service(&fx);
        let admin = fx.admin().await;
        let coach = fx.trainer("coach@gym.test").await;
        let class = fx.class(&coach, Duration::days(2), 10).await;
        for email in ["a@gym.test", "b@gym.test", "c@gym.test"] {
            let member = fx.member(email).await;
            fx.repos.enrollments.enroll(class.id, member.id, None).await.unwrap();
        }

        let shrink = |capacity| UpdateClassRequest {
            capacity: Some(capacity),
            ..UpdateClassRequest::default()
        };
        let err = classes
            .update_class(&Fixture::principal(&admin), class.id, shrink(2))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);

        let updated = classes
            .update_class(&Fixture::principal(&admin), class.id, shrink(3))
            .await
            .unwrap();
        assert_eq!(updated.enrolled_count, 3);
        assert_eq!(updated.remaining_spots, 0);
    }

    #[tokio::test]
    async fn test_shrink_racing_enrollment_keeps_capacity() {
        let fx = Fixture::new();
        let classes = service(&fx);
        let admin = fx.admin().await;
        let coach = fx.trainer("coach@gym.test").await;
        let class = fx.class(&coach, Duration::days(2), 2).await;
        let ana = fx.member("ana@gym.test").await;
        let bob = fx.member("bob@gym.test").await;
        fx.repos.enrollments.enroll(class.id, ana.id, None).await.unwrap();

        let shrink = UpdateClassRequest {
            capacity: Some(1),
            ..UpdateClassRequest::default()
        };
        let admin = Fixture::principal(&admin);
        let (shrunk, _) = tokio::join!(
            classes.update_class(&admin, class.id, shrink),
            fx.repos.enrollments.enroll(class.id, bob.id, None),
        );

        let stored = fx.repos.classes.find_by_id(class.id).await.unwrap().unwrap();
        let enrolled = fx.repos.classes.enrolled_count(class.id).await.unwrap();
        assert!(enrolled <= u64::from(stored.capacity));
        assert_eq!(shrunk.is_ok(), enrolled == 1);
    }

    #[tokio::test]
    async fn test_moving_class_onto_busy_slot_conflicts() {
        let fx = Fixture::new();
        let classes = service(&fx);
        let coach = fx.trainer("coach@gym.test").await;
        fx.class(&coach, Duration::days(1), 10).await;
        let later = fx.class(&coach, Duration::days(3), 10).await;

        let starts_at = Fixture::now() + Duration::days(1) + Duration::minutes(30);
        let request = UpdateClassRequest {
            starts_at: Some(starts_at),
            ends_at: Some(starts_at + Duration::hours(1)),
            ..UpdateClassRequest::default()
        };
        let err = classes
            .update_class(&Fixture::principal(&coach.user), later.id, request)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);

        let stored = fx.repos.classes.find_by_id(later.id).await.unwrap().unwrap();
        assert_eq!(stored.starts_at, later.starts_at);
    }

    #[tokio::test]
    async fn test_list_trainer_classes() {
        let fx = Fixture::new();
        let classes = service(&fx);
        let member = fx.member("ana@gym.test").await;
        let coach = fx.trainer("coach@gym.test").await;
        let other = fx.trainer("other@gym.test").await;
        fx.class(&coach, Duration::days(1), 10).await;
        fx.class(&coach, Duration::days(2), 10).await;
        fx.class(&other, Duration::days(1), 10).await;

        let page = classes
            .list_trainer_classes(&Fixture::principal(&member), coach.trainer.id, PageRequest::first())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.items[0].starts_at < page.items[1].starts_at);

        let err = classes
            .list_trainer_classes(&Fixture::principal(&member), TrainerId::new(), PageRequest::first())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_delete_class_admin_only() {
        let fx = Fixture::new();
        let classes = service(&fx);
        let admin = fx.admin().await;
        let coach = fx.trainer("coach@gym.test").await;
        let class = fx.class(&coach, Duration::days(1), 10).await;

        let err = classes
            .delete_class(&Fixture::principal(&coach.user), class.id)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);

        classes.delete_class(&Fixture::principal(&admin), class.id).await.unwrap();
        let err = classes.get_class(&Fixture::principal(&admin), class.id).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
