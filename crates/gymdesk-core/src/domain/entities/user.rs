//! User entity (admins, trainers and members share one table).

use super::super::value_objects::{Email, UserRole, UserStatus};
use crate::{Entity, GymdeskError, GymdeskResult, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A person who can log in to the gym system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,

    /// Hashed password (never exposed via API).
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: UserRole,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub status: UserStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new active user with the given role.
    #[must_use]
    pub fn new(
        first_name: String,
        last_name: String,
        email: Email,
        password_hash: String,
        role: UserRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            first_name,
            last_name,
            email,
            password_hash,
            role,
            phone: None,
            date_of_birth: None,
            status: UserStatus::Active,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns "first last".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    #[must_use]
    pub const fn can_login(&self) -> bool {
        self.status.can_login()
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    #[must_use]
    pub const fn is_trainer(&self) -> bool {
        matches!(self.role, UserRole::Trainer)
    }

    #[must_use]
    pub const fn is_member(&self) -> bool {
        matches!(self.role, UserRole::Member)
    }

    /// Checks if the user has the specified role or higher.
    #[must_use]
    pub const fn has_role(&self, required_role: UserRole) -> bool {
        self.role.has_permission(required_role)
    }

    /// Records a successful login.
    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    /// Updates the user's password hash.
    pub fn update_password(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }

    pub fn change_role(&mut self, role: UserRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    pub fn change_status(&mut self, status: UserStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

impl Entity<UserId> for User {
    fn id(&self) -> &UserId {
        &self.id
    }
}

/// Builder for creating User instances.
#[derive(Debug, Default)]
pub struct UserBuilder {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<Email>,
    password_hash: Option<String>,
    role: Option<UserRole>,
    phone: Option<String>,
    date_of_birth: Option<NaiveDate>,
    status: Option<UserStatus>,
}

impl UserBuilder {
    /// Creates a new user builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn last_name(mut self, name: impl Into<String>) -> Self {
        self.last_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: Email) -> Self {
        self.email = Some(email);
        self
    }

    #[must_use]
    pub fn password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }

    #[must_use]
    pub fn role(mut self, role: UserRole) -> Self {
        self.role = Some(role);
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: Option<String>) -> Self {
        self.phone = phone;
        self
    }

    #[must_use]
    pub fn date_of_birth(mut self, date_of_birth: Option<NaiveDate>) -> Self {
        self.date_of_birth = date_of_birth;
        self
    }

    #[must_use]
    pub fn status(mut self, status: UserStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Builds the User instance.
    ///
    /// # Errors
    ///
    /// Returns a validation error if names, email or password hash are missing.
    pub fn build(self) -> GymdeskResult<User> {
        let missing = |field: &str| GymdeskError::validation(format!("{field} is required"));

        let mut user = User::new(
            self.first_name.ok_or_else(|| missing("first_name"))?,
            self.last_name.ok_or_else(|| missing("last_name"))?,
            self.email.ok_or_else(|| missing("email"))?,
            self.password_hash.ok_or_else(|| missing("password_hash"))?,
            self.role.unwrap_or_default(),
        );
        user.phone = self.phone;
        user.date_of_birth = self.date_of_birth;
        if let Some(status) = self.status {
            user.status = status;
        }

        Ok(user)
    }
}
