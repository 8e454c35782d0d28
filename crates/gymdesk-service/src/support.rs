//! Lookups shared by several services.

use gymdesk_core::{Email, GymdeskError, GymdeskResult, Permission, TrainerId, User, UserId, UserRole};
use gymdesk_repository::{PlanFilter, TrainerRepository, UserRepository};
use gymdesk_security::{ClaimsExt, Principal};

pub(crate) fn parse_email(raw: &str) -> GymdeskResult<Email> {
    Email::new(raw).map_err(|e| GymdeskError::Validation(e.to_string()))
}

pub(crate) async fn load_user(users: &dyn UserRepository, id: UserId) -> GymdeskResult<User> {
    users
        .find_by_id(id)
        .await?
        .ok_or_else(|| GymdeskError::not_found("User", id))
}

/// Loads a user that must hold the member role.
pub(crate) async fn load_member(users: &dyn UserRepository, id: UserId) -> GymdeskResult<User> {
    let user = load_user(users, id).await?;
    if user.role != UserRole::Member {
        return Err(GymdeskError::validation(format!("User {id} is not a member")));
    }
    Ok(user)
}

/// Trainer credited as the author of a plan written by `principal`.
///
/// Trainers always author their own plans. Admins may name a trainer or
/// leave the plan unattributed.
pub(crate) async fn plan_author(
    trainers: &dyn TrainerRepository,
    principal: &Principal,
    requested: Option<TrainerId>,
) -> GymdeskResult<Option<TrainerId>> {
    principal.require_permission(Permission::PlanManage)?;

    if principal.is_admin() {
        if let Some(id) = requested {
            if trainers.find_by_id(id).await?.is_none() {
                return Err(GymdeskError::not_found("Trainer", id));
            }
        }
        return Ok(requested);
    }

    let own = trainers
        .find_by_user_id(principal.user_id)
        .await?
        .ok_or_else(|| GymdeskError::Forbidden("No trainer profile for this account".to_string()))?;
    Ok(Some(own.trainer.id))
}

/// Members only ever list their own plans.
pub(crate) fn scope_plan_filter(principal: &Principal, mut filter: PlanFilter) -> GymdeskResult<PlanFilter> {
    principal.require_permission(Permission::PlanRead)?;
    if principal.is_member() {
        filter.member_id = Some(principal.user_id);
    }
    Ok(filter)
}
