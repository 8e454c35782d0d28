//! RBAC permission checker.

use crate::{Claims, Principal};
use gymdesk_core::{GymdeskError, GymdeskResult, Permission, UserId, UserRole};

/// Anything that carries a role and (usually) a user id.
pub trait AccessSubject {
    fn subject_role(&self) -> UserRole;
    fn subject_id(&self) -> Option<UserId>;
}

impl AccessSubject for Claims {
    fn subject_role(&self) -> UserRole {
        self.role
    }

    fn subject_id(&self) -> Option<UserId> {
        self.user_id()
    }
}

impl AccessSubject for Principal {
    fn subject_role(&self) -> UserRole {
        self.role
    }

    fn subject_id(&self) -> Option<UserId> {
        Some(self.user_id)
    }
}

/// Extension trait to check permissions on claims or a principal.
pub trait ClaimsExt {
    /// Requires a specific role.
    fn require_role(&self, role: UserRole) -> GymdeskResult<()>;

    /// Requires a specific permission.
    fn require_permission(&self, permission: Permission) -> GymdeskResult<()>;

    /// Requires either the specified role or being the resource owner.
    fn require_role_or_owner(&self, role: UserRole, resource_owner_id: UserId) -> GymdeskResult<()>;

    /// Checks if the user is the owner of a resource.
    fn is_owner(&self, resource_owner_id: UserId) -> bool;

    /// Requires the user to be an admin.
    fn require_admin(&self) -> GymdeskResult<()>;

    /// Requires the user to be a trainer or an admin.
    fn require_staff(&self) -> GymdeskResult<()>;
}

impl<T: AccessSubject> ClaimsExt for T {
    fn require_role(&self, role: UserRole) -> GymdeskResult<()> {
        let actual = self.subject_role();
        if actual.has_permission(role) {
            Ok(())
        } else {
            Err(GymdeskError::Forbidden(format!("Required role: {role}, your role: {actual}")))
        }
    }

    fn require_permission(&self, permission: Permission) -> GymdeskResult<()> {
        if permission.is_allowed_for(self.subject_role()) {
            Ok(())
        } else {
            Err(GymdeskError::Forbidden(format!(
                "Permission denied: {} requires at least {} role",
                permission,
                permission.minimum_role()
            )))
        }
    }

    fn require_role_or_owner(&self, role: UserRole, resource_owner_id: UserId) -> GymdeskResult<()> {
        if self.subject_role().has_permission(role) || self.is_owner(resource_owner_id) {
            Ok(())
        } else {
            Err(GymdeskError::Forbidden(
                "You don't have permission to access this resource".to_string(),
            ))
        }
    }

    fn is_owner(&self, resource_owner_id: UserId) -> bool {
        self.subject_id().is_some_and(|id| id == resource_owner_id)
    }

    fn require_admin(&self) -> GymdeskResult<()> {
        self.require_role(UserRole::Admin)
    }

    fn require_staff(&self) -> GymdeskResult<()> {
        self.require_role(UserRole::Trainer)
    }
}

/// Permission guard evaluated by handlers before calling a service.
#[derive(Debug, Clone, Default)]
pub struct PermissionGuard {
    required_role: Option<UserRole>,
    required_permission: Option<Permission>,
    allow_owner: bool,
}

impl PermissionGuard {
    /// Creates a guard that admits any authenticated caller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires a specific role.
    #[must_use]
    pub fn role(mut self, role: UserRole) -> Self {
        self.required_role = Some(role);
        self
    }

    /// Requires a specific permission.
    #[must_use]
    pub fn permission(mut self, permission: Permission) -> Self {
        self.required_permission = Some(permission);
        self
    }

    /// Allows resource owners to access regardless of role.
    #[must_use]
    pub fn allow_owner(mut self) -> Self {
        self.allow_owner = true;
        self
    }

    /// Checks if the subject satisfies the guard requirements.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` when neither ownership nor role admits the caller.
    pub fn check<S: ClaimsExt>(&self, subject: &S, resource_owner_id: Option<UserId>) -> GymdeskResult<()> {
        if self.allow_owner {
            if let Some(owner_id) = resource_owner_id {
                if subject.is_owner(owner_id) {
                    return Ok(());
                }
            }
        }

        if let Some(role) = self.required_role {
            subject.require_role(role)?;
        }

        if let Some(permission) = self.required_permission {
            subject.require_permission(permission)?;
        }

        Ok(())
    }
}

/// Predefined permission guards for common scenarios.
pub mod guards {
    use super::{Permission, PermissionGuard, UserRole};

    /// Any authenticated user.
    #[must_use]
    pub fn authenticated() -> PermissionGuard {
        PermissionGuard::new()
    }

    #[must_use]
    pub fn admin() -> PermissionGuard {
        PermissionGuard::new().role(UserRole::Admin)
    }

    /// Trainers and admins.
    #[must_use]
    pub fn staff() -> PermissionGuard {
        PermissionGuard::new().role(UserRole::Trainer)
    }

    /// The resource owner, or an admin.
    #[must_use]
    pub fn owner_or_admin() -> PermissionGuard {
        PermissionGuard::new().role(UserRole::Admin).allow_owner()
    }

    /// The resource owner, or any trainer or admin.
    #[must_use]
    pub fn owner_or_staff() -> PermissionGuard {
        PermissionGuard::new().role(UserRole::Trainer).allow_owner()
    }

    #[must_use]
    pub fn attendance_marking() -> PermissionGuard {
        PermissionGuard::new().permission(Permission::AttendanceMark)
    }

    #[must_use]
    pub fn payment_processing() -> PermissionGuard {
        PermissionGuard::new().permission(Permission::PaymentProcess)
    }
}
