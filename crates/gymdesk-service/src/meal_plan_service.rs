//! Meal plan service.

use crate::dto::{CreateMealPlanRequest, MealPlanResponse, UpdateMealPlanRequest};
use crate::mappers::PageResponse;
use crate::support::{load_member, plan_author, scope_plan_filter};
use async_trait::async_trait;
use gymdesk_core::{Clock, GymdeskError, GymdeskResult, MealPlan, MealPlanId, PageRequest, Permission, ValidateExt};
use gymdesk_repository::{MealPlanRepository, PlanFilter, TrainerRepository, UserRepository};
use gymdesk_security::{guards, ClaimsExt, Principal};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Meal plan service trait.
#[async_trait]
pub trait MealPlanService: Send + Sync {
    async fn create_plan(&self, principal: &Principal, request: CreateMealPlanRequest) -> GymdeskResult<MealPlanResponse>;

    async fn get_plan(&self, principal: &Principal, id: MealPlanId) -> GymdeskResult<MealPlanResponse>;

    async fn list_plans(
        &self,
        principal: &Principal,
        filter: PlanFilter,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<MealPlanResponse>>;

    async fn update_plan(
        &self,
        principal: &Principal,
        id: MealPlanId,
        request: UpdateMealPlanRequest,
    ) -> GymdeskResult<MealPlanResponse>;

    async fn delete_plan(&self, principal: &Principal, id: MealPlanId) -> GymdeskResult<()>;
}

pub struct MealPlanServiceImpl {
    plan_repository: Arc<dyn MealPlanRepository>,
    user_repository: Arc<dyn UserRepository>,
    trainer_repository: Arc<dyn TrainerRepository>,
    clock: Arc<dyn Clock>,
}

impl MealPlanServiceImpl {
    pub fn new(
        plan_repository: Arc<dyn MealPlanRepository>,
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

    async fn load(&self, id: MealPlanId) -> GymdeskResult<MealPlan> {
        self.plan_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| GymdeskError::not_found("MealPlan", id))
    }
}

/// Logs plans whose meals add up to more than the daily target.
fn note_calorie_overrun(plan: &MealPlan) {
    let listed = plan.listed_calories();
    if listed > plan.daily_calories {
        warn!(
            "Meal plan {} lists {} kcal against a {} kcal target",
            plan.id, listed, plan.daily_calories
        );
    }
}

#[async_trait]
impl MealPlanService for MealPlanServiceImpl {
    async fn create_plan(&self, principal: &Principal, request: CreateMealPlanRequest) -> GymdeskResult<MealPlanResponse> {
        debug!("Creating meal plan '{}' for member {}", request.title, request.member_id);

        let trainer_id = plan_author(self.trainer_repository.as_ref(), principal, request.trainer_id).await?;
        request.validate_request()?;
        load_member(self.user_repository.as_ref(), request.member_id).await?;

        let now = self.clock.now();
        let mut plan = MealPlan::new(
            request.member_id,
            request.title.trim().to_string(),
            request.daily_calories,
            request.meals,
        );
        plan.trainer_id = trainer_id;
        plan.description = request.description;
        plan.created_at = now;
        plan.updated_at = now;
        note_calorie_overrun(&plan);

        let saved = self.plan_repository.save(&plan).await?;

        info!("Meal plan created: {}", saved.id);
        Ok(MealPlanResponse::from(saved))
    }

    async fn get_plan(&self, principal: &Principal, id: MealPlanId) -> GymdeskResult<MealPlanResponse> {
        let plan = self.load(id).await?;
        guards::owner_or_staff().check(principal, Some(plan.member_id))?;

        Ok(MealPlanResponse::from(plan))
    }

    async fn list_plans(
        &self,
        principal: &Principal,
        filter: PlanFilter,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<MealPlanResponse>> {
        let filter = scope_plan_filter(principal, filter)?;

        let plans = self.plan_repository.find_all(&filter, page).await?;
        Ok(PageResponse::from_page(plans, MealPlanResponse::from))
    }

    async fn update_plan(
        &self,
        principal: &Principal,
        id: MealPlanId,
        request: UpdateMealPlanRequest,
    ) -> GymdeskResult<MealPlanResponse> {
        debug!("Updating meal plan: {}", id);

        principal.require_permission(Permission::PlanManage)?;
        request.validate_request()?;

        let mut plan = self.load(id).await?;
        if let Some(title) = request.title {
            plan.title = title.trim().to_string();
        }
        if request.description.is_some() {
            plan.description = request.description;
        }
        if let Some(calories) = request.daily_calories {
            plan.daily_calories = calories;
        }
        if let Some(meals) = request.meals {
            plan.meals = meals;
        }
        plan.updated_at = self.clock.now();
        note_calorie_overrun(&plan);

        let updated = self.plan_repository.update(&plan).await?;

        info!("Meal plan updated: {}", id);
        Ok(MealPlanResponse::from(updated))
    }

    async fn delete_plan(&self, principal: &Principal, id: MealPlanId) -> GymdeskResult<()> {
        principal.require_permission(Permission::PlanManage)?;

        if !self.plan_repository.delete(id).await? {
            return Err(GymdeskError::not_found("MealPlan", id));
        }

        info!("Meal plan deleted: {}", id);
        Ok(())
    }
}

impl std::fmt::Debug for MealPlanServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MealPlanServiceImpl").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use gymdesk_core::{Meal, UserId};

    fn service(fx: &Fixture) -> MealPlanServiceImpl {
        MealPlanServiceImpl::new(
            Arc::clone(&fx.repos.meal_plans),
            Arc::clone(&fx.repos.users),
            Arc::clone(&fx.repos.trainers),
            fx.clock(),
        )
    }

    fn meal(name: &str, calories: u32) -> Meal {
        Meal {
            name: name.to_string(),
            time: None,
            items: vec!["oats".to_string()],
            calories: Some(calories),
        }
    }

    fn create_request(member_id: UserId) -> CreateMealPlanRequest {
        CreateMealPlanRequest {
            member_id,
            trainer_id: None,
            title: "Cutting".to_string(),
            description: None,
            daily_calories: 2000,
            meals: vec![meal("Breakfast", 500), meal("Lunch", 700)],
        }
    }

    #[tokio::test]
    async fn test_create_meal_plan() {
        let fx = Fixture::new();
        let plans = service(&fx);
        let coach = fx.trainer("coach@gym.test").await;
        let ana = fx.member("ana@gym.test").await;

        let created = plans
            .create_plan(&Fixture::principal(&coach.user), create_request(ana.id))
            .await
            .unwrap();
        assert_eq!(created.trainer_id, Some(coach.trainer.id));
        assert_eq!(created.listed_calories, 1200);
    }

    #[tokio::test]
    async fn test_calorie_bounds() {
        let fx = Fixture::new();
        let plans = service(&fx);
        let admin = fx.admin().await;
        let ana = fx.member("ana@gym.test").await;

        let mut request = create_request(ana.id);
        request.daily_calories = 700;
        let err = plans
            .create_plan(&Fixture::principal(&admin), request)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_unknown_author_for_admin() {
        let fx = Fixture::new();
        let plans = service(&fx);
        let admin = fx.admin().await;
        let ana = fx.member("ana@gym.test").await;

        let mut request = create_request(ana.id);
        request.trainer_id = Some(gymdesk_core::TrainerId::new());
        let err = plans
            .create_plan(&Fixture::principal(&admin), request)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_update_meals_and_member_visibility() {
        let fx = Fixture::new();
        let plans = service(&fx);
        let coach = fx.trainer("coach@gym.test").await;
        let ana = fx.member("ana@gym.test").await;
        let bob = fx.member("bob@gym.test").await;
        let plan = plans
            .create_plan(&Fixture::principal(&coach.user), create_request(ana.id))
            .await
            .unwrap();

        let request = UpdateMealPlanRequest {
            meals: Some(vec![meal("Dinner", 900)]),
            ..UpdateMealPlanRequest::default()
        };
        let updated = plans
            .update_plan(&Fixture::principal(&coach.user), plan.id, request)
            .await
            .unwrap();
        assert_eq!(updated.listed_calories, 900);

        assert!(plans.get_plan(&Fixture::principal(&ana), plan.id).await.is_ok());
        let err = plans.get_plan(&Fixture::principal(&bob), plan.id).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        let bobs = plans
            .list_plans(&Fixture::principal(&bob), PlanFilter::default(), PageRequest::first())
            .await
            .unwrap();
        assert!(bobs.items.is_empty());
    }
}
