//! MySQL workout and meal plan repositories.
//!
//! Exercise and meal lists live in `JSON` columns.

use super::{bind_u64, count, parse_enum, parse_id, parse_opt_id};
use crate::traits::{MealPlanRepository, PlanFilter, WorkoutPlanRepository};
use crate::DatabasePool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gymdesk_core::{
    Difficulty, Exercise, GymdeskError, GymdeskResult, Meal, MealPlan, MealPlanId, Page, PageRequest, WorkoutPlan,
    WorkoutPlanId,
};
use sqlx::types::Json;
use sqlx::{FromRow, MySql, QueryBuilder};
use std::sync::Arc;
use tracing::{debug, info};

const WORKOUT_COLUMNS: &str = "id, member_id, trainer_id, title, description, goal, difficulty, duration_weeks, \
     exercises, created_at, updated_at";

const MEAL_COLUMNS: &str =
    "id, member_id, trainer_id, title, description, daily_calories, meals, created_at, updated_at";

fn push_plan_filter(builder: &mut QueryBuilder<'_, MySql>, filter: &PlanFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(member_id) = filter.member_id {
        builder.push(" AND member_id = ").push_bind(member_id.to_string());
    }
    if let Some(trainer_id) = filter.trainer_id {
        builder.push(" AND trainer_id = ").push_bind(trainer_id.to_string());
    }
}

/// MySQL workout plan repository implementation.
#[derive(Clone)]
pub struct MySqlWorkoutPlanRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlWorkoutPlanRepository {
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct WorkoutPlanRow {
    id: String,
    member_id: String,
    trainer_id: Option<String>,
    title: String,
    description: Option<String>,
    goal: Option<String>,
    difficulty: String,
    duration_weeks: u32,
    exercises: Json<Vec<Exercise>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WorkoutPlanRow> for WorkoutPlan {
    type Error = GymdeskError;

    fn try_from(row: WorkoutPlanRow) -> Result<Self, Self::Error> {
        Ok(WorkoutPlan {
            id: parse_id(&row.id, "workout_plans.id")?,
            member_id: parse_id(&row.member_id, "workout_plans.member_id")?,
            trainer_id: parse_opt_id(row.trainer_id.as_deref(), "workout_plans.trainer_id")?,
            title: row.title,
            description: row.description,
            goal: row.goal,
            difficulty: parse_enum(&row.difficulty, "workout_plans.difficulty", Difficulty::parse)?,
            duration_weeks: row.duration_weeks,
            exercises: row.exercises.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl WorkoutPlanRepository for MySqlWorkoutPlanRepository {
    async fn find_by_id(&self, id: WorkoutPlanId) -> GymdeskResult<Option<WorkoutPlan>> {
        debug!("Finding workout plan by id: {}", id);
        let row = sqlx::query_as::<_, WorkoutPlanRow>(&format!(
            "SELECT {WORKOUT_COLUMNS} FROM workout_plans WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(self.pool.inner())
        .await?;

        row.map(WorkoutPlan::try_from).transpose()
    }

    async fn find_all(&self, filter: &PlanFilter, page: PageRequest) -> GymdeskResult<Page<WorkoutPlan>> {
        debug!("Finding workout plans, page: {}, size: {}", page.page, page.size);

        let mut count_query = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM workout_plans");
        push_plan_filter(&mut count_query, filter);
        let total = count_query.build_query_scalar::<i64>().fetch_one(self.pool.inner()).await?;

        let mut query = QueryBuilder::<MySql>::new(format!("SELECT {WORKOUT_COLUMNS} FROM workout_plans"));
        push_plan_filter(&mut query, filter);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(bind_u64(page.limit()))
            .push(" OFFSET ")
            .push_bind(bind_u64(page.offset()));

        let rows = query.build_query_as::<WorkoutPlanRow>().fetch_all(self.pool.inner()).await?;
        let plans = rows.into_iter().map(WorkoutPlan::try_from).collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(plans, page, count(total)))
    }

    async fn save(&self, plan: &WorkoutPlan) -> GymdeskResult<WorkoutPlan> {
        debug!("Saving workout plan '{}' for member {}", plan.title, plan.member_id);
        sqlx::query(&format!(
            "INSERT INTO workout_plans ({WORKOUT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(plan.id.to_string())
        .bind(plan.member_id.to_string())
        .bind(plan.trainer_id.map(|id| id.to_string()))
        .bind(&plan.title)
        .bind(&plan.description)
        .bind(&plan.goal)
        .bind(plan.difficulty.as_str())
        .bind(plan.duration_weeks)
        .bind(Json(&plan.exercises))
        .bind(plan.created_at)
        .bind(plan.updated_at)
        .execute(self.pool.inner())
        .await?;

        info!("Created workout plan {}", plan.id);
        self.find_by_id(plan.id)
            .await?
            .ok_or_else(|| GymdeskError::Internal("Failed to fetch inserted workout plan".to_string()))
    }

    async fn update(&self, plan: &WorkoutPlan) -> GymdeskResult<WorkoutPlan> {
        debug!("Updating workout plan: {}", plan.id);
        let result = sqlx::query(
            r"
            UPDATE workout_plans
            SET title = ?, description = ?, goal = ?, difficulty = ?, duration_weeks = ?, exercises = ?,
                updated_at = ?
            WHERE id = ?
            ",
        )
        .bind(&plan.title)
        .bind(&plan.description)
        .bind(&plan.goal)
        .bind(plan.difficulty.as_str())
        .bind(plan.duration_weeks)
        .bind(Json(&plan.exercises))
        .bind(plan.updated_at)
        .bind(plan.id.to_string())
        .execute(self.pool.inner())
        .await?;

        if result.rows_affected() == 0 {
            return Err(GymdeskError::not_found("WorkoutPlan", plan.id));
        }
        self.find_by_id(plan.id)
            .await?
            .ok_or_else(|| GymdeskError::Internal("Failed to fetch updated workout plan".to_string()))
    }

    async fn delete(&self, id: WorkoutPlanId) -> GymdeskResult<bool> {
        debug!("Deleting workout plan: {}", id);
        let result = sqlx::query("DELETE FROM workout_plans WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool.inner())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl std::fmt::Debug for MySqlWorkoutPlanRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlWorkoutPlanRepository").finish_non_exhaustive()
    }
}

/// MySQL meal plan repository implementation.
#[derive(Clone)]
pub struct MySqlMealPlanRepository {
    pool: Arc<DatabasePool>,
}

impl MySqlMealPlanRepository {
    #[must_use]
    pub fn new(pool: Arc<DatabasePool>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MealPlanRow {
    id: String,
    member_id: String,
    trainer_id: Option<String>,
    title: String,
    description: Option<String>,
    daily_calories: u32,
    meals: Json<Vec<Meal>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MealPlanRow> for MealPlan {
    type Error = GymdeskError;

    fn try_from(row: MealPlanRow) -> Result<Self, Self::Error> {
        Ok(MealPlan {
            id: parse_id(&row.id, "meal_plans.id")?,
            member_id: parse_id(&row.member_id, "meal_plans.member_id")?,
            trainer_id: parse_opt_id(row.trainer_id.as_deref(), "meal_plans.trainer_id")?,
            title: row.title,
            description: row.description,
            daily_calories: row.daily_calories,
            meals: row.meals.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl MealPlanRepository for MySqlMealPlanRepository {
    async fn find_by_id(&self, id: MealPlanId) -> GymdeskResult<Option<MealPlan>> {
        debug!("Finding meal plan by id: {}", id);
        let row = sqlx::query_as::<_, MealPlanRow>(&format!("SELECT {MEAL_COLUMNS} FROM meal_plans WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(self.pool.inner())
            .await?;

        row.map(MealPlan::try_from).transpose()
    }

    async fn find_all(&self, filter: &PlanFilter, page: PageRequest) -> GymdeskResult<Page<MealPlan>> {
        debug!("Finding meal plans, page: {}, size: {}", page.page, page.size);

        let mut count_query = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM meal_plans");
        push_plan_filter(&mut count_query, filter);
        let total = count_query.build_query_scalar::<i64>().fetch_one(self.pool.inner()).await?;

        let mut query = QueryBuilder::<MySql>::new(format!("SELECT {MEAL_COLUMNS} FROM meal_plans"));
        push_plan_filter(&mut query, filter);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(bind_u64(page.limit()))
            .push(" OFFSET ")
            .push_bind(bind_u64(page.offset()));

        let rows = query.build_query_as::<MealPlanRow>().fetch_all(self.pool.inner()).await?;
        let plans = rows.into_iter().map(MealPlan::try_from).collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(plans, page, count(total)))
    }

    async fn save(&self, plan: &MealPlan) -> GymdeskResult<MealPlan> {
        debug!("Saving meal plan '{}' for member {}", plan.title, plan.member_id);
        sqlx::query(&format!(
            "INSERT INTO meal_plans ({MEAL_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(plan.id.to_string())
        .bind(plan.member_id.to_string())
        .bind(plan.trainer_id.map(|id| id.to_string()))
        .bind(&plan.title)
        .bind(&plan.description)
        .bind(plan.daily_calories)
        .bind(Json(&plan.meals))
        .bind(plan.created_at)
        .bind(plan.updated_at)
        .execute(self.pool.inner())
        .await?;

        info!("Created meal plan {}", plan.id);
        self.find_by_id(plan.id)
            .await?
            .ok_or_else(|| GymdeskError::Internal("Failed to fetch inserted meal plan".to_string()))
    }

    async fn update(&self, plan: &MealPlan) -> GymdeskResult<MealPlan> {
        debug!("Updating meal plan: {}", plan.id);
        let result = sqlx::query(
            r"
            UPDATE meal_plans
            SET title = ?, description = ?, daily_calories = ?, meals = ?, updated_at = ?
            WHERE id = ?
            ",
        )
        .bind(&plan.title)
        .bind(&plan.description)
        .bind(plan.daily_calories)
        .bind(Json(&plan.meals))
        .bind(plan.updated_at)
        .bind(plan.id.to_string())
        .execute(self.pool.inner())
        .await?;

        if result.rows_affected() == 0 {
            return Err(GymdeskError::not_found("MealPlan", plan.id));
        }
        self.find_by_id(plan.id)
            .await?
            .ok_or_else(|| GymdeskError::Internal("Failed to fetch updated meal plan".to_string()))
    }

    async fn delete(&self, id: MealPlanId) -> GymdeskResult<bool> {
        debug!("Deleting meal plan: {}", id);
        let result = sqlx::query("DELETE FROM meal_plans WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool.inner())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl std::fmt::Debug for MySqlMealPlanRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlMealPlanRepository").finish_non_exhaustive()
    }
}
