//! Workout and meal plans written by trainers for members.

use super::super::value_objects::Difficulty;
use crate::{Entity, MealPlanId, TrainerId, UserId, WorkoutPlanId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One exercise line of a workout plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Exercise {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(range(min = 1, max = 20))]
    pub sets: u32,
    #[validate(range(min = 1, max = 200))]
    pub reps: u32,
    #[validate(range(max = 900))]
    pub rest_seconds: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: WorkoutPlanId,
    pub member_id: UserId,
    /// Author; cleared if the trainer is removed.
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

impl WorkoutPlan {
    #[must_use]
    pub fn new(member_id: UserId, title: String, duration_weeks: u32, exercises: Vec<Exercise>) -> Self {
        let now = Utc::now();
        Self {
            id: WorkoutPlanId::new(),
            member_id,
            trainer_id: None,
            title,
            description: None,
            goal: None,
            difficulty: Difficulty::default(),
            duration_weeks,
            exercises,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity<WorkoutPlanId> for WorkoutPlan {
    fn id(&self) -> &WorkoutPlanId {
        &self.id
    }
}

/// One meal of a meal plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Meal {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    /// Free-form time of day, e.g. "07:30".
    #[validate(length(max = 16))]
    pub time: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<String>,
    #[validate(range(max = 4000))]
    pub calories: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlan {
    pub id: MealPlanId,
    pub member_id: UserId,
    pub trainer_id: Option<TrainerId>,
    pub title: String,
    pub description: Option<String>,
    pub daily_calories: u32,
    pub meals: Vec<Meal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MealPlan {
    #[must_use]
    pub fn new(member_id: UserId, title: String, daily_calories: u32, meals: Vec<Meal>) -> Self {
        let now = Utc::now();
        Self {
            id: MealPlanId::new(),
            member_id,
            trainer_id: None,
            title,
            description: None,
            daily_calories,
            meals,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sum of the per-meal calorie figures that were filled in.
    #[must_use]
    pub fn listed_calories(&self) -> u32 {
        self.meals.iter().filter_map(|m| m.calories).sum()
    }
}

impl Entity<MealPlanId> for MealPlan {
    fn id(&self) -> &MealPlanId {
        &self.id
    }
}
