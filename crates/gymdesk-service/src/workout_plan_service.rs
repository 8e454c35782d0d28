//! Workout plan service.

use crate::dto::{CreateWorkoutPlanRequest, UpdateWorkoutPlanRequest, WorkoutPlanResponse};
use crate::mappers::PageResponse;
use crate::support::{load_member, plan_author, scope_plan_filter};
use async_trait::async_trait;
use gymdesk_core::{
    Clock, GymdeskError, GymdeskResult, PageRequest, Permission, ValidateExt, WorkoutPlan, WorkoutPlanId,
};
use gymdesk_repository::{PlanFilter, TrainerRepository, UserRepository, WorkoutPlanRepository};
use gymdesk_security::{guards, ClaimsExt, Principal};
use std::sync::Arc;
use tracing::{debug, info};

/// Workout plan service trait.
#[async_trait]
pub trait WorkoutPlanService: Send + Sync {
    async fn create_plan(
        &self,
        principal: &Principal,
        request: CreateWorkoutPlanRequest,
    ) -> GymdeskResult<WorkoutPlanResponse>;

    /// Gets a plan (its member, any trainer, or an admin).
    async fn get_plan(&self, principal: &Principal, id: WorkoutPlanId) -> GymdeskResult<WorkoutPlanResponse>;

    /// Lists plans. Members only see their own.
    async fn list_plans(
        &self,
        principal: &Principal,
        filter: PlanFilter,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<WorkoutPlanResponse>>;

    async fn update_plan(
        &self,
        principal: &Principal,
        id: WorkoutPlanId,
        request: UpdateWorkoutPlanRequest,
    ) -> GymdeskResult<WorkoutPlanResponse>;

    async fn delete_plan(&self, principal: &Principal, id: WorkoutPlanId) -> GymdeskResult<()>;
}

/// Workout plan service implementation.
pub struct WorkoutPlanServiceImpl {
    plan_repository: Arc<dyn WorkoutPlanRepository>,
    user_repository: Arc<dyn UserRepository>,
    trainer_repository: Arc<dyn TrainerRepository>,
    clock: Arc<dyn Clock>,
}

impl WorkoutPlanServiceImpl {
    pub fn new(
        plan_repository: Arc<dyn WorkoutPlanRepository>,
        user_repository: Arc<dyn UserRepository>,
        trainer_repository: Arc<dyn TrainerRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            plan_repository,
            user_repository,
            trainer_repository,
            clock,
        }
    }

    async fn load(&self, id: WorkoutPlanId) -> GymdeskResult<WorkoutPlan> {
        self.plan_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| GymdeskError::not_found("WorkoutPlan", id))
    }
}

#[async_trait]
impl WorkoutPlanService for WorkoutPlanServiceImpl {
    async fn create_plan(
        &self,
        principal: &Principal,
        request: CreateWorkoutPlanRequest,
    ) -> GymdeskResult<WorkoutPlanResponse> {
        debug!("Creating workout plan '{}' for member {}", request.title, request.member_id);

        let trainer_id = plan_author(self.trainer_repository.as_ref(), principal, request.trainer_id).await?;
        request.validate_request()?;
        load_member(self.user_repository.as_ref(), request.member_id).await?;

        let now = self.clock.now();
        let mut plan = WorkoutPlan::new(
            request.member_id,
            request.title.trim().to_string(),
            request.duration_weeks,
            request.exercises,
        );
        plan.trainer_id = trainer_id;
        plan.description = request.description;
        plan.goal = request.goal;
        plan.difficulty = request.difficulty;
        plan.created_at = now;
        plan.updated_at = now;

        let saved = self.plan_repository.save(&plan).await?;

        info!("Workout plan created: {}", saved.id);
        Ok(WorkoutPlanResponse::from(saved))
    }

    async fn get_plan(&self, principal: &Principal, id: WorkoutPlanId) -> GymdeskResult<WorkoutPlanResponse> {
        debug!("Getting workout plan: {}", id);

        let plan = self.load(id).await?;
        guards::owner_or_staff().check(principal, Some(plan.member_id))?;

        Ok(WorkoutPlanResponse::from(plan))
    }

    async fn list_plans(
        &self,
        principal: &Principal,
        filter: PlanFilter,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<WorkoutPlanResponse>> {
        let filter = scope_plan_filter(principal, filter)?;
        debug!("Listing workout plans: {:?}", filter);

        let plans = self.plan_repository.find_all(&filter, page).await?;
        Ok(PageResponse::from_page(plans, WorkoutPlanResponse::from))
    }

    async fn update_plan(
        &self,
        principal: &Principal,
        id: WorkoutPlanId,
        request: UpdateWorkoutPlanRequest,
    ) -> GymdeskResult<WorkoutPlanResponse> {
        debug!("Updating workout plan: {}", id);

        principal.require_permission(Permission::PlanManage)?;
        request.validate_request()?;

        let mut plan = self.load(id).await?;
        if let Some(title) = request.title {
            plan.title = title.trim().to_string();
        }
        if request.description.is_some() {
            plan.description = request.description;
        }
        if request.goal.is_some() {
            plan.goal = request.goal;
        }
        if let Some(difficulty) = request.difficulty {
            plan.difficulty = difficulty;
        }
        if let Some(weeks) = request.duration_weeks {
            plan.duration_weeks = weeks;
        }
        if let Some(exercises) = request.exercises {
            plan.exercises = exercises;
        }
        plan.updated_at = self.clock.now();

        let updated = self.plan_repository.update(&plan).await?;

        info!("Workout plan updated: {}", id);
        Ok(WorkoutPlanResponse::from(updated))
    }

    async fn delete_plan(&self, principal: &Principal, id: WorkoutPlanId) -> GymdeskResult<()> {
        debug!("Deleting workout plan: {}", id);

        principal.require_permission(Permission::PlanManage)?;

        if !self.plan_repository.delete(id).await? {
            return Err(GymdeskError::not_found("WorkoutPlan", id));
        }

        info!("Workout plan deleted: {}", id);
        Ok(())
    }
}

impl std::fmt::Debug for WorkoutPlanServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkoutPlanServiceImpl").finish_non_exhaustive()
    }
}
