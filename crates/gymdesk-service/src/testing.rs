//! Shared fixtures for the service tests.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use gymdesk_config::{GymConfig, SecurityConfig};
use gymdesk_core::{
    Clock, Email, FixedClock, GymClass, Membership, MembershipType, Trainer, TrainerProfile, User, UserRole,
};
use gymdesk_repository::memory::MemoryStore;
use gymdesk_repository::Repositories;
use gymdesk_security::{PasswordHasher, Principal, TokenProvider};
use std::sync::Arc;

pub(crate) struct Fixture {
    pub repos: Repositories,
    pub hasher: Arc<PasswordHasher>,
    pub tokens: Arc<TokenProvider>,
    pub gym: GymConfig,
}

impl Fixture {
    pub const PASSWORD: &'static str = "Secret123";

    pub fn new() -> Self {
        let security = SecurityConfig {
            password_memory_cost_kib: 64,
            password_time_cost: 1,
            ..SecurityConfig::default()
        };
        Self {
            repos: Repositories::memory(Arc::new(MemoryStore::new())),
            hasher: Arc::new(PasswordHasher::from_config(&security)),
            tokens: Arc::new(TokenProvider::new(Arc::new(security))),
            gym: GymConfig::default(),
        }
    }

    /// Monday 2024-06-10, noon UTC.
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()
    }

    pub fn today() -> NaiveDate {
        Self::now().date_naive()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::new(FixedClock(Self::now()))
    }

    pub fn principal(user: &User) -> Principal {
        Principal::new(user.id, user.role)
    }

    fn user(&self, email: &str, role: UserRole) -> User {
        User::new(
            "Test".to_string(),
            "Person".to_string(),
            Email::new(email).unwrap(),
            self.hasher.hash(Self::PASSWORD).unwrap(),
            role,
        )
    }

    pub async fn admin(&self) -> User {
        let admin = self.user("admin@gym.test", UserRole::Admin);
        self.repos.users.save(&admin).await.unwrap()
    }

    /// A member whose monthly membership started five days ago.
    pub async fn member(&self, email: &str) -> User {
        let member = self.user(email, UserRole::Member);
        let membership =
            Membership::start(member.id, MembershipType::Monthly, Self::today() - Duration::days(5)).unwrap();
        self.repos.users.register(&member, Some(&membership)).await.unwrap()
    }

    pub async fn member_without_membership(&self, email: &str) -> User {
        let member = self.user(email, UserRole::Member);
        self.repos.users.save(&member).await.unwrap()
    }

    pub async fn trainer(&self, email: &str) -> TrainerProfile {
        let user = self.user(email, UserRole::Trainer);
        let profile = TrainerProfile {
            trainer: Trainer::new(user.id, "Strength".to_string(), 4),
            user,
        };
        self.repos.trainers.create(&profile).await.unwrap()
    }

    /// A one-hour class starting `starts_in` from now.
    pub async fn class(&self, trainer: &TrainerProfile, starts_in: Duration, capacity: u32) -> GymClass {
        let starts_at = Self::now() + starts_in;
        let class = GymClass::new(
            "Circuit".to_string(),
            trainer.trainer.id,
            starts_at,
            starts_at + Duration::hours(1),
            capacity,
        )
        .unwrap();
        self.repos.classes.save(&class).await.unwrap()
    }
}
