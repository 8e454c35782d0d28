//! Workout and meal plan DTOs.

use chrono::{DateTime, Utc};
use gymdesk_core::rules::not_blank;
use gymdesk_core::{
    Difficulty, Exercise, Meal, MealPlan, MealPlanId, TrainerId, UserId, WorkoutPlan, WorkoutPlanId,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateWorkoutPlanRequest {
    pub member_id: UserId,

    /// Honoured for admins only; a trainer always authors their own plans.
    pub trainer_id: Option<TrainerId>,

    #[validate(
        length(min = 1, max = 120, message = "Title must be 1-120 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(length(max = 200))]
    pub goal: Option<String>,

    #[serde(default)]
    pub difficulty: Difficulty,

    #[validate(range(min = 1, max = 52, message = "Duration must be 1-52 weeks"))]
    pub duration_weeks: u32,

    #[validate(length(min = 1, message = "At least one exercise is required"), nested)]
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateWorkoutPlanRequest {
    #[validate(length(min = 1, max = 120), custom(function = "not_blank"))]
    pub title: Option<String>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(length(max = 200))]
    pub goal: Option<String>,

    pub difficulty: Option<Difficulty>,

    #[validate(range(min = 1, max = 52, message = "Duration must be 1-52 weeks"))]
    pub duration_weeks: Option<u32>,

    #[validate(length(min = 1, message = "At least one exercise is required"), nested)]
    pub exercises: Option<Vec<Exercise>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkoutPlanResponse {
    pub id: WorkoutPlanId,
    pub member_id: UserId,
    pub trainer_id: Option<TrainerId>,
    pub title: String,
    pub description: Option<String>,
    pub goal: Option<String>,
    pub difficulty: Difficulty,
    pub duration_weeks: u32,
    pub exercises: Vec<Exercise>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WorkoutPlan> for WorkoutPlanResponse {
    fn from(plan: WorkoutPlan) -> Self {
        Self {
            id: plan.id,
            member_id: plan.member_id,
            trainer_id: plan.trainer_id,
            title: plan.title,
            description: plan.description,
            goal: plan.goal,
            difficulty: plan.difficulty,
            duration_weeks: plan.duration_weeks,
            exercises: plan.exercises,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMealPlanRequest {
    pub member_id: UserId,

    /// Honoured for admins only; a trainer always authors their own plans.
    pub trainer_id: Option<TrainerId>,

    #[validate(
        length(min = 1, max = 120, message = "Title must be 1-120 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(range(min = 800, max = 6000, message = "Daily calories must be 800-6000"))]
    pub daily_calories: u32,

    #[validate(length(min = 1, message = "At least one meal is required"), nested)]
    pub meals: Vec<Meal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateMealPlanRequest {
    #[validate(length(min = 1, max = 120), custom(function = "not_blank"))]
    pub title: Option<String>,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[validate(range(min = 800, max = 6000, message = "Daily calories must be 800-6000"))]
    pub daily_calories: Option<u32>,

    #[validate(length(min = 1, message = "At least one meal is required"), nested)]
    pub meals: Option<Vec<Meal>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MealPlanResponse {
    pub id: MealPlanId,
    pub member_id: UserId,
    pub trainer_id: Option<TrainerId>,
    pub title: String,
    pub description: Option<String>,
    pub daily_calories: u32,
    /// Sum of the calories given on individual meals.
    pub listed_calories: u32,
    pub meals: Vec<Meal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MealPlan> for MealPlanResponse {
    fn from(plan: MealPlan) -> Self {
        Self {
            listed_calories: plan.listed_calories(),
            id: plan.id,
            member_id: plan.member_id,
            trainer_id: plan.trainer_id,
            title: plan.title,
            description: plan.description,
            daily_calories: plan.daily_calories,
            meals: plan.meals,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }
}
