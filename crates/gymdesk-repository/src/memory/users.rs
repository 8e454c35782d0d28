//! Users, trainers and memberships.

use super::{matches_search, paginate, MemoryStore};
use crate::traits::{MembershipRepository, TrainerRepository, UserFilter, UserRepository};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use gymdesk_core::{
    GymdeskError, GymdeskResult, Membership, MembershipStatus, MembershipType, Page, PageRequest, TrainerId,
    TrainerProfile, User, UserId, UserRole,
};

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> GymdeskResult<Option<User>> {
        Ok(self.tables.lock().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> GymdeskResult<Option<User>> {
        Ok(self
            .tables
            .lock()
            .users
            .values()
            .find(|u| u.email.as_str().eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn exists_by_email(&self, email: &str) -> GymdeskResult<bool> {
        Ok(self.tables.lock().email_taken(email, None))
    }

    async fn find_all(&self, filter: &UserFilter, page: PageRequest) -> GymdeskResult<Page<User>> {
        let tables = self.tables.lock();
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| filter.role.map_or(true, |role| u.role == role))
            .filter(|u| {
                matches_search(
                    filter.search.as_deref(),
                    &[u.first_name.as_str(), u.last_name.as_str(), u.email.as_str()],
                )
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(paginate(&users, page))
    }

    async fn save(&self, user: &User) -> GymdeskResult<User> {
        self.tables.lock().insert_user(user)?;
        Ok(user.clone())
    }

    async fn register(&self, user: &User, membership: Option<&Membership>) -> GymdeskResult<User> {
        let mut tables = self.tables.lock();
        tables.insert_user(user)?;
        if let Some(membership) = membership {
            tables.memberships.insert(membership.user_id, membership.clone());
        }
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> GymdeskResult<User> {
        let mut tables = self.tables.lock();
        if !tables.users.contains_key(&user.id) {
            return Err(GymdeskError::not_found("User", user.id));
        }
        if tables.email_taken(user.email.as_str(), Some(user.id)) {
            return Err(GymdeskError::conflict(format!("Duplicate entry '{}' for key 'users.email'", user.email)));
        }
        let mut stored = user.clone();
        stored.updated_at = Utc::now();
        tables.users.insert(user.id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: UserId) -> GymdeskResult<bool> {
        let mut tables = self.tables.lock();
        if !tables.users.contains_key(&id) {
            return Ok(false);
        }
        if tables.trainers.values().any(|t| t.user_id == id) {
            return Err(GymdeskError::conflict("user is referenced by a trainer profile"));
        }

        let enrollment_ids: Vec<_> = tables
            .enrollments
            .iter()
            .filter(|e| e.member_id == id)
            .map(|e| e.id)
            .collect();
        tables.drop_attendance_of(&enrollment_ids);
        tables.enrollments.retain(|e| e.member_id != id);
        tables.payments.retain(|p| p.member_id != id);
        tables.workout_plans.retain(|_, p| p.member_id != id);
        tables.meal_plans.retain(|_, p| p.member_id != id);
        tables.memberships.remove(&id);
        tables.users.remove(&id);
        Ok(true)
    }

    async fn count_by_role(&self, role: UserRole) -> GymdeskResult<u64> {
        Ok(self.tables.lock().users.values().filter(|u| u.role == role).count() as u64)
    }
}

#[async_trait]
impl TrainerRepository for MemoryStore {
    async fn find_by_id(&self, id: TrainerId) -> GymdeskResult<Option<TrainerProfile>> {
        let tables = self.tables.lock();
        Ok(tables.trainers.get(&id).and_then(|trainer| {
            tables.users.get(&trainer.user_id).map(|user| TrainerProfile {
                trainer: trainer.clone(),
                user: user.clone(),
            })
        }))
    }

    async fn find_by_user_id(&self, user_id: UserId) -> GymdeskResult<Option<TrainerProfile>> {
        let tables = self.tables.lock();
        Ok(tables
            .trainers
            .values()
            .find(|t| t.user_id == user_id)
            .and_then(|trainer| {
                tables.users.get(&user_id).map(|user| TrainerProfile {
                    trainer: trainer.clone(),
                    user: user.clone(),
                })
            }))
    }

    async fn find_all(&self, search: Option<&str>, page: PageRequest) -> GymdeskResult<Page<TrainerProfile>> {
        let tables = self.tables.lock();
        let mut profiles: Vec<TrainerProfile> = tables
            .trainers
            .values()
            .filter_map(|trainer| {
                tables.users.get(&trainer.user_id).map(|user| TrainerProfile {
                    trainer: trainer.clone(),
                    user: user.clone(),
                })
            })
            .filter(|p| {
                matches_search(
                    search,
                    &[p.user.first_name.as_str(), p.user.last_name.as_str(), p.trainer.specialization.as_str()],
                )
            })
            .collect();
        profiles.sort_by(|a, b| {
            a.user
                .last_name
                .cmp(&b.user.last_name)
                .then_with(|| a.user.first_name.cmp(&b.user.first_name))
        });
        Ok(paginate(&profiles, page))
    }

    async fn create(&self, profile: &TrainerProfile) -> GymdeskResult<TrainerProfile> {
        let mut tables = self.tables.lock();
        tables.insert_user(&profile.user)?;
        tables.trainers.insert(profile.trainer.id, profile.trainer.clone());
        Ok(profile.clone())
    }

    async fn update(&self, profile: &TrainerProfile) -> GymdeskResult<TrainerProfile> {
        let mut tables = self.tables.lock();
        if !tables.trainers.contains_key(&profile.trainer.id) || !tables.users.contains_key(&profile.user.id) {
            return Err(GymdeskError::not_found("Trainer", profile.trainer.id));
        }
        if tables.email_taken(profile.user.email.as_str(), Some(profile.user.id)) {
            return Err(GymdeskError::conflict(format!(
                "Duplicate entry '{}' for key 'users.email'",
                profile.user.email
            )));
        }
        tables.users.insert(profile.user.id, profile.user.clone());
        tables.trainers.insert(profile.trainer.id, profile.trainer.clone());
        Ok(profile.clone())
    }

    async fn delete(&self, id: TrainerId) -> GymdeskResult<bool> {
        let mut tables = self.tables.lock();
        let Some(trainer) = tables.trainers.get(&id).cloned() else {
            return Ok(false);
        };

        let class_ids: Vec<_> = tables
            .classes
            .values()
            .filter(|c| c.trainer_id == id)
            .map(|c| c.id)
            .collect();
        let enrollment_ids: Vec<_> = tables
            .enrollments
            .iter()
            .filter(|e| class_ids.contains(&e.class_id))
            .map(|e| e.id)
            .collect();
        tables.drop_attendance_of(&enrollment_ids);
        tables.enrollments.retain(|e| !class_ids.contains(&e.class_id));
        tables.classes.retain(|_, c| c.trainer_id != id);
        for plan in tables.workout_plans.values_mut().filter(|p| p.trainer_id == Some(id)) {
            plan.trainer_id = None;
        }
        for plan in tables.meal_plans.values_mut().filter(|p| p.trainer_id == Some(id)) {
            plan.trainer_id = None;
        }
        tables.trainers.remove(&id);
        tables.memberships.remove(&trainer.user_id);
        tables.users.remove(&trainer.user_id);
        Ok(true)
    }

    async fn count(&self) -> GymdeskResult<u64> {
        Ok(self.tables.lock().trainers.len() as u64)
    }
}

#[async_trait]
impl MembershipRepository for MemoryStore {
    async fn find_by_user(&self, user_id: UserId) -> GymdeskResult<Option<Membership>> {
        Ok(self.tables.lock().memberships.get(&user_id).cloned())
    }

    async fn find_all(
        &self,
        status: Option<MembershipStatus>,
        today: NaiveDate,
        page: PageRequest,
    ) -> GymdeskResult<Page<Membership>> {
        let tables = self.tables.lock();
        let mut memberships: Vec<Membership> = tables
            .memberships
            .values()
            .filter(|m| status.map_or(true, |s| m.effective_status(today) == s))
            .cloned()
            .collect();
        memberships.sort_by_key(|m| m.expiry_date);
        Ok(paginate(&memberships, page))
    }

    async fn save(&self, membership: &Membership) -> GymdeskResult<Membership> {
        let mut tables = self.tables.lock();
        if tables.memberships.contains_key(&membership.user_id) {
            return Err(GymdeskError::conflict("Duplicate entry for key 'memberships.user_id'"));
        }
        tables.memberships.insert(membership.user_id, membership.clone());
        Ok(membership.clone())
    }

    async fn update(&self, membership: &Membership) -> GymdeskResult<Membership> {
        let mut tables = self.tables.lock();
        match tables.memberships.get_mut(&membership.user_id) {
            Some(stored) if stored.id == membership.id => {
                *stored = membership.clone();
                Ok(membership.clone())
            }
            _ => Err(GymdeskError::not_found("Membership", membership.id)),
        }
    }

    async fn renew(
        &self,
        user_id: UserId,
        membership_type: Option<MembershipType>,
        periods: u32,
        today: NaiveDate,
    ) -> GymdeskResult<Option<Membership>> {
        let mut tables = self.tables.lock();
        let Some(stored) = tables.memberships.get_mut(&user_id) else {
            return Ok(None);
        };
        let mut membership = stored.clone();
        membership.renew(membership_type.unwrap_or(membership.membership_type), periods, today)?;
        *stored = membership.clone();
        Ok(Some(membership))
    }

    async fn expire_overdue(&self, today: NaiveDate) -> GymdeskResult<u64> {
        let mut tables = self.tables.lock();
        let expired = tables
            .memberships
            .values_mut()
            .map(|m| m.expire_if_overdue(today))
            .filter(|changed| *changed)
            .count();
        Ok(expired as u64)
    }

    async fn count_by_status(&self, status: MembershipStatus, today: NaiveDate) -> GymdeskResult<u64> {
        Ok(self
            .tables
            .lock()
            .memberships
            .values()
            .filter(|m| m.effective_status(today) == status)
            .count() as u64)
    }
}
