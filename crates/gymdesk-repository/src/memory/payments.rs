//! Payments and plans.

use super::{paginate, MemoryStore};
use crate::traits::{
    MealPlanRepository, MembershipRenewal, PaymentFilter, PaymentRepository, PlanFilter, WorkoutPlanRepository,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gymdesk_core::{
    GymdeskError, GymdeskResult, MealPlan, MealPlanId, Membership, Page, PageRequest, Payment, PaymentId,
    PaymentStatus, ProcessedPayment, TrainerId, UserId, WorkoutPlan, WorkoutPlanId,
};

fn plan_matches(filter: &PlanFilter, member_id: UserId, trainer_id: Option<TrainerId>) -> bool {
    filter.member_id.map_or(true, |m| m == member_id) && filter.trainer_id.map_or(true, |t| trainer_id == Some(t))
}

fn in_range(at: DateTime<Utc>, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> bool {
    from.map_or(true, |from| at >= from) && to.map_or(true, |to| at < to)
}

#[async_trait]
impl PaymentRepository for MemoryStore {
    async fn process(&self, payment: &Payment, renewal: Option<MembershipRenewal>) -> GymdeskResult<ProcessedPayment> {
        let mut tables = self.tables.lock();
        if !tables.users.contains_key(&payment.member_id) {
            return Err(GymdeskError::Database("foreign key payments.member_id violated".to_string()));
        }

        // Work on a copy so a failed renewal leaves both tables untouched.
        let membership = match renewal {
            None => None,
            Some(renewal) => match tables.memberships.get(&payment.member_id).cloned() {
                Some(mut membership) => {
                    membership.renew(renewal.membership_type, 1, renewal.today)?;
                    Some(membership)
                }
                None => Some(Membership::start(payment.member_id, renewal.membership_type, renewal.today)?),
            },
        };

        tables.payments.push(payment.clone());
        if let Some(membership) = &membership {
            tables.memberships.insert(membership.user_id, membership.clone());
        }
        Ok(ProcessedPayment {
            payment: payment.clone(),
            membership,
        })
    }

    async fn find_by_id(&self, id: PaymentId) -> GymdeskResult<Option<Payment>> {
        Ok(self.tables.lock().payments.iter().find(|p| p.id == id).cloned())
    }

    async fn find_all(&self, filter: &PaymentFilter, page: PageRequest) -> GymdeskResult<Page<Payment>> {
        let tables = self.tables.lock();
        let mut payments: Vec<Payment> = tables
            .payments
            .iter()
            .filter(|p| filter.member_id.map_or(true, |m| p.member_id == m))
            .filter(|p| filter.status.map_or(true, |s| p.status == s))
            .filter(|p| in_range(p.paid_at, filter.from, filter.to))
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.paid_at.cmp(&a.paid_at));
        Ok(paginate(&payments, page))
    }

    async fn update(&self, payment: &Payment) -> GymdeskResult<Payment> {
        let mut tables = self.tables.lock();
        let Some(stored) = tables.payments.iter_mut().find(|p| p.id == payment.id) else {
            return Err(GymdeskError::not_found("Payment", payment.id));
        };
        stored.status = payment.status;
        stored.reference.clone_from(&payment.reference);
        stored.notes.clone_from(&payment.notes);
        Ok(stored.clone())
    }

    async fn revenue_cents(&self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> GymdeskResult<i64> {
        Ok(self
            .tables
            .lock()
            .payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Completed && in_range(p.paid_at, from, to))
            .map(|p| p.amount_cents)
            .sum())
    }
}

#[async_trait]
impl WorkoutPlanRepository for MemoryStore {
    async fn find_by_id(&self, id: WorkoutPlanId) -> GymdeskResult<Option<WorkoutPlan>> {
        Ok(self.tables.lock().workout_plans.get(&id).cloned())
    }

    async fn find_all(&self, filter: &PlanFilter, page: PageRequest) -> GymdeskResult<Page<WorkoutPlan>> {
        let tables = self.tables.lock();
        let mut plans: Vec<WorkoutPlan> = tables
            .workout_plans
            .values()
            .filter(|p| plan_matches(filter, p.member_id, p.trainer_id))
            .cloned()
            .collect();
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(&plans, page))
    }

    async fn save(&self, plan: &WorkoutPlan) -> GymdeskResult<WorkoutPlan> {
        let mut tables = self.tables.lock();
        if !tables.users.contains_key(&plan.member_id) {
            return Err(GymdeskError::Database("foreign key workout_plans.member_id violated".to_string()));
        }
        tables.workout_plans.insert(plan.id, plan.clone());
        Ok(plan.clone())
    }

    async fn update(&self, plan: &WorkoutPlan) -> GymdeskResult<WorkoutPlan> {
        let mut tables = self.tables.lock();
        match tables.workout_plans.get_mut(&plan.id) {
            Some(stored) => {
                *stored = plan.clone();
                Ok(plan.clone())
            }
            None => Err(GymdeskError::not_found("WorkoutPlan", plan.id)),
        }
    }

    async fn delete(&self, id: WorkoutPlanId) -> GymdeskResult<bool> {
        Ok(self.tables.lock().workout_plans.remove(&id).is_some())
    }
}

#[async_trait]
impl MealPlanRepository for MemoryStore {
    async fn find_by_id(&self, id: MealPlanId) -> GymdeskResult<Option<MealPlan>> {
        Ok(self.tables.lock().meal_plans.get(&id).cloned())
    }

    async fn find_all(&self, filter: &PlanFilter, page: PageRequest) -> GymdeskResult<Page<MealPlan>> {
        let tables = self.tables.lock();
        let mut plans: Vec<MealPlan> = tables
            .meal_plans
            .values()
            .filter(|p| plan_matches(filter, p.member_id, p.trainer_id))
            .cloned()
            .collect();
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(&plans, page))
    }

    async fn save(&self, plan: &MealPlan) -> GymdeskResult<MealPlan> {
        let mut tables = self.tables.lock();
        if !tables.users.contains_key(&plan.member_id) {
            return Err(GymdeskError::Database("foreign key meal_plans.member_id violated".to_string()));
        }
        tables.meal_plans.insert(plan.id, plan.clone());
        Ok(plan.clone())
    }

    async fn update(&self, plan: &MealPlan) -> GymdeskResult<MealPlan> {
        let mut tables = self.tables.lock();
        match tables.meal_plans.get_mut(&plan.id) {
            Some(stored) => {
                *stored = plan.clone();
                Ok(plan.clone())
            }
            None => Err(GymdeskError::not_found("MealPlan", plan.id)),
        }
    }

    async fn delete(&self, id: MealPlanId) -> GymdeskResult<bool> {
        Ok(self.tables.lock().meal_plans.remove(&id).is_some())
    }
}
