//! Authentication service implementation.

use crate::dto::{AuthResponse, ChangePasswordRequest, LoginRequest, RefreshTokenRequest, RegisterRequest, UserResponse};
use crate::support::{load_user, parse_email};
use async_trait::async_trait;
use gymdesk_config::BootstrapAdmin;
use gymdesk_core::{Clock, GymdeskError, GymdeskResult, Membership, User, UserBuilder, UserRole, ValidateExt};
use gymdesk_repository::UserRepository;
use gymdesk_security::{PasswordHasher, Principal, TokenProvider};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Authentication service trait.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Registers a new member, with a first membership when one is requested.
    async fn register(&self, request: RegisterRequest) -> GymdeskResult<AuthResponse>;

    /// Logs in a user.
    async fn login(&self, request: LoginRequest) -> GymdeskResult<AuthResponse>;

    /// Exchanges a refresh token for a new token pair.
    async fn refresh_token(&self, request: RefreshTokenRequest) -> GymdeskResult<AuthResponse>;

    /// Gets the calling user.
    async fn me(&self, principal: &Principal) -> GymdeskResult<UserResponse>;

    /// Changes the caller's password after checking the current one.
    async fn change_password(&self, principal: &Principal, request: ChangePasswordRequest) -> GymdeskResult<()>;

    /// Creates the configured admin account unless its email is taken.
    /// Returns the new admin, or `None` when nothing was created.
    async fn bootstrap_admin(&self, admin: &BootstrapAdmin) -> GymdeskResult<Option<UserResponse>>;
}

/// Authentication service implementation.
pub struct AuthServiceImpl {
    user_repository: Arc<dyn UserRepository>,
    password_hasher: Arc<PasswordHasher>,
    token_provider: Arc<TokenProvider>,
    clock: Arc<dyn Clock>,
}

impl AuthServiceImpl {
    /// Creates a new authentication service.
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        password_hasher: Arc<PasswordHasher>,
        token_provider: Arc<TokenProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repository,
            password_hasher,
            token_provider,
            clock,
        }
    }

    fn create_auth_response(&self, user: &User) -> GymdeskResult<AuthResponse> {
        let tokens = self.token_provider.generate_tokens(user)?;

        Ok(AuthResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_in: self.token_provider.access_token_ttl_secs(),
            user: UserResponse::from(user),
        })
    }
}

#[async_trait]
impl AuthService for AuthServiceImpl {
    async fn register(&self, request: RegisterRequest) -> GymdeskResult<AuthResponse> {
        debug!("Registering member: {}", request.email);

        request.validate_request()?;

        let email = parse_email(&request.email)?;
        if self.user_repository.exists_by_email(email.as_str()).await? {
            return Err(GymdeskError::Conflict(format!("Email '{email}' is already registered")));
        }

        let password_hash = self.password_hasher.hash(&request.password)?;
        let user = UserBuilder::new()
            .first_name(request.first_name.trim())
            .last_name(request.last_name.trim())
            .email(email)
            .password_hash(password_hash)
            .role(UserRole::Member)
            .phone(request.phone)
            .date_of_birth(request.date_of_birth)
            .build()?;

        let membership = request
            .membership_type
            .map(|membership_type| Membership::start(user.id, membership_type, self.clock.today()))
            .transpose()?;

        let saved_user = self.user_repository.register(&user, membership.as_ref()).await?;

        info!(
            "Member registered: {} (membership: {})",
            saved_user.id,
            membership.as_ref().map_or("none", |m| m.membership_type.as_str())
        );
        self.create_auth_response(&saved_user)
    }

    async fn login(&self, request: LoginRequest) -> GymdeskResult<AuthResponse> {
        debug!("Login attempt for: {}", request.email);

        request.validate_request()?;

        let mut user = self
            .user_repository
            .find_by_email(request.email.trim())
            .await?
            .ok_or_else(|| {
                warn!("Login failed: unknown email - {}", request.email);
                GymdeskError::InvalidCredentials
            })?;

        if !self.password_hasher.verify(&request.password, &user.password_hash)? {
            warn!("Login failed: invalid password - {}", user.id);
            return Err(GymdeskError::InvalidCredentials);
        }

        if !user.can_login() {
            warn!("Login refused: account {} is {}", user.id, user.status);
            return Err(GymdeskError::Forbidden(format!("Account is {}", user.status)));
        }

        if self.password_hasher.needs_rehash(&user.password_hash) {
            user.update_password(self.password_hasher.hash(&request.password)?);
            info!("Password hash upgraded for user: {}", user.id);
        }
        user.record_login();
        if let Err(e) = self.user_repository.update(&user).await {
            warn!("Could not record login for {}: {}", user.id, e);
        }

        info!("User logged in: {}", user.id);
        self.create_auth_response(&user)
    }

    async fn refresh_token(&self, request: RefreshTokenRequest) -> GymdeskResult<AuthResponse> {
        debug!("Refreshing token");

        request.validate_request()?;

        let claims = self.token_provider.validate_refresh_token(&request.refresh_token)?;
        let user_id = claims
            .user_id()
            .ok_or_else(|| GymdeskError::InvalidToken("Invalid refresh token: missing user ID".to_string()))?;

        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| GymdeskError::InvalidToken("User no longer exists".to_string()))?;

        if !user.can_login() {
            return Err(GymdeskError::Forbidden("Account is not active".to_string()));
        }

        info!("Token refreshed for user: {}", user.id);
        self.create_auth_response(&user)
    }

    async fn me(&self, principal: &Principal) -> GymdeskResult<UserResponse> {
        let user = load_user(self.user_repository.as_ref(), principal.user_id).await?;
        Ok(UserResponse::from(user))
    }

    async fn change_password(&self, principal: &Principal, request: ChangePasswordRequest) -> GymdeskResult<()> {
        debug!("Changing password for user: {}", principal.user_id);

        request.validate_request()?;

        let mut user = load_user(self.user_repository.as_ref(), principal.user_id).await?;
        if !self.password_hasher.verify(&request.current_password, &user.password_hash)? {
            return Err(GymdeskError::InvalidCredentials);
        }

        user.update_password(self.password_hasher.hash(&request.new_password)?);
        self.user_repository.update(&user).await?;

        info!("Password changed for user: {}", user.id);
        Ok(())
    }

    async fn bootstrap_admin(&self, admin: &BootstrapAdmin) -> GymdeskResult<Option<UserResponse>> {
        let email = parse_email(&admin.email)?;
        if self.user_repository.exists_by_email(email.as_str()).await? {
            debug!("Bootstrap admin {} already exists", email);
            return Ok(None);
        }

        let user = User::new(
            admin.first_name.clone(),
            admin.last_name.clone(),
            email,
            self.password_hasher.hash(&admin.password)?,
            UserRole::Admin,
        );
        let saved = self.user_repository.save(&user).await?;

        info!("Bootstrap admin created: {} ({})", saved.email, saved.id);
        Ok(Some(UserResponse::from(saved)))
    }
}

impl std::fmt::Debug for AuthServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthServiceImpl").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use gymdesk_core::{MembershipType, UserStatus};
    use gymdesk_repository::MembershipRepository;

    fn service(fx: &Fixture) -> AuthServiceImpl {
        AuthServiceImpl::new(
            Arc::clone(&fx.repos.users),
            Arc::clone(&fx.hasher),
            Arc::clone(&fx.tokens),
            fx.clock(),
        )
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Ana".to_string(),
            last_name: "Silva".to_string(),
            email: email.to_string(),
            password: "Secret123".to_string(),
            phone: Some("+351 912 345 678".to_string()),
            date_of_birth: None,
            membership_type: Some(MembershipType::Quarterly),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_creates_member_with_membership() {
        let fx = Fixture::new();
        let auth = service(&fx);

        let response = auth.register(register_request("Ana@Gym.test")).await.unwrap();
        assert_eq!(response.user.role, UserRole::Member);
        assert_eq!(response.user.email, "ana@gym.test");
        assert_eq!(response.token_type, "Bearer");

        let membership = fx
            .repos
            .memberships
            .find_by_user(response.user.id)
            .await
            .unwrap()
            .expect("membership should exist");
        assert_eq!(membership.start_date, Fixture::today());
        assert_eq!(membership.membership_type, MembershipType::Quarterly);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let fx = Fixture::new();
        let auth = service(&fx);

        auth.register(register_request("ana@gym.test")).await.unwrap();
        let err = auth.register(register_request("ANA@gym.test")).await.unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_login_success_records_login() {
        let fx = Fixture::new();
        let auth = service(&fx);
        let member = fx.member("ana@gym.test").await;

        let response = auth.login(login_request("ana@gym.test", Fixture::PASSWORD)).await.unwrap();
        assert_eq!(response.user.id, member.id);

        let claims = fx.tokens.validate_access_token(&response.access_token).unwrap();
        assert_eq!(claims.user_id(), Some(member.id));
        let stored = fx.repos.users.find_by_id(member.id).await.unwrap().unwrap();
        assert!(stored.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_login_same_error_for_unknown_email_and_wrong_password() {
        let fx = Fixture::new();
        let auth = service(&fx);
        fx.member("ana@gym.test").await;

        let unknown = auth.login(login_request("nobody@gym.test", "Secret123")).await.unwrap_err();
        let wrong = auth.login(login_request("ana@gym.test", "Wrong1234")).await.unwrap_err();
        assert_eq!(unknown.status_code(), 401);
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_login_inactive_account_forbidden() {
        let fx = Fixture::new();
        let auth = service(&fx);
        let mut member = fx.member("ana@gym.test").await;
        member.change_status(UserStatus::Suspended);
        fx.repos.users.update(&member).await.unwrap();

        let err = auth.login(login_request("ana@gym.test", Fixture::PASSWORD)).await.unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_login_upgrades_bcrypt_hash() {
        let fx = Fixture::new();
        let auth = service(&fx);
        let mut member = fx.member("legacy@gym.test").await;
        member.update_password(bcrypt::hash(Fixture::PASSWORD, 4).unwrap());
        fx.repos.users.update(&member).await.unwrap();

        auth.login(login_request("legacy@gym.test", Fixture::PASSWORD)).await.unwrap();

        let stored = fx.repos.users.find_by_id(member.id).await.unwrap().unwrap();
        assert!(stored.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_refresh_issues_new_pair() {
        let fx = Fixture::new();
        let auth = service(&fx);
        fx.member("ana@gym.test").await;
        let login = auth.login(login_request("ana@gym.test", Fixture::PASSWORD)).await.unwrap();

        let refreshed = auth
            .refresh_token(RefreshTokenRequest {
                refresh_token: login.refresh_token.clone(),
            })
            .await
            .unwrap();
        assert_eq!(refreshed.user.id, login.user.id);

        let err = auth
            .refresh_token(RefreshTokenRequest {
                refresh_token: login.access_token,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn test_change_password_requires_current() {
        let fx = Fixture::new();
        let auth = service(&fx);
        let member = fx.member("ana@gym.test").await;
        let principal = Fixture::principal(&member);

        let wrong = ChangePasswordRequest {
            current_password: "Nope12345".to_string(),
            new_password: "Changed123".to_string(),
        };
        assert_eq!(auth.change_password(&principal, wrong).await.unwrap_err().status_code(), 401);

        let right = ChangePasswordRequest {
            current_password: Fixture::PASSWORD.to_string(),
            new_password: "Changed123".to_string(),
        };
        auth.change_password(&principal, right).await.unwrap();
        assert!(auth.login(login_request("ana@gym.test", "Changed123")).await.is_ok());
    }

    #[tokio::test]
    async fn test_bootstrap_admin_is_idempotent() {
        let fx = Fixture::new();
        let auth = service(&fx);
        let admin = BootstrapAdmin {
            email: "root@gym.test".to_string(),
            password: "Admin12345".to_string(),
            first_name: "Gym".to_string(),
            last_name: "Admin".to_string(),
        };

        let created = auth.bootstrap_admin(&admin).await.unwrap().expect("admin created");
        assert_eq!(created.role, UserRole::Admin);
        assert!(auth.bootstrap_admin(&admin).await.unwrap().is_none());
    }
}
