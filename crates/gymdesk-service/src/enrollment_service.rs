//! Enrollment service: members joining and leaving classes.

use crate::dto::{EnrollRequest, EnrollmentResponse};
use crate::mappers::PageResponse;
use async_trait::async_trait;
use gymdesk_config::GymConfig;
use gymdesk_core::{ClassId, Clock, EnrollmentOutcome, GymdeskError, GymdeskResult, PageRequest, UserId};
use gymdesk_repository::{ClassRepository, EnrollmentRepository};
use gymdesk_security::{guards, ClaimsExt, Principal};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Enrollment service trait.
#[async_trait]
pub trait EnrollmentService: Send + Sync {
    /// Enrolls a member in a class. Members always enroll themselves; staff
    /// must name the member.
    async fn enroll(
        &self,
        principal: &Principal,
        class_id: ClassId,
        request: EnrollRequest,
    ) -> GymdeskResult<EnrollmentResponse>;

    /// Removes an enrollment and its attendance (self or staff).
    async fn unenroll(&self, principal: &Principal, class_id: ClassId, member_id: UserId) -> GymdeskResult<()>;

    /// Enrollments of one class (staff only).
    async fn list_class_enrollments(
        &self,
        principal: &Principal,
        class_id: ClassId,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<EnrollmentResponse>>;

    /// Enrollments of one member (self or staff).
    async fn list_member_enrollments(
        &self,
        principal: &Principal,
        member_id: UserId,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<EnrollmentResponse>>;
}

/// Enrollment service implementation.
pub struct EnrollmentServiceImpl {
    enrollment_repository: Arc<dyn EnrollmentRepository>,
    class_repository: Arc<dyn ClassRepository>,
    gym: GymConfig,
    clock: Arc<dyn Clock>,
}

impl EnrollmentServiceImpl {
    pub fn new(
        enrollment_repository: Arc<dyn EnrollmentRepository>,
        class_repository: Arc<dyn ClassRepository>,
        gym: GymConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            enrollment_repository,
            class_repository,
            gym,
            clock,
        }
    }
}

#[async_trait]
impl EnrollmentService for EnrollmentServiceImpl {
    async fn enroll(
        &self,
        principal: &Principal,
        class_id: ClassId,
        request: EnrollRequest,
    ) -> GymdeskResult<EnrollmentResponse> {
        let member_id = if principal.is_member() {
            principal.user_id
        } else {
            request
                .member_id
                .ok_or_else(|| GymdeskError::validation("member_id is required"))?
        };
        debug!("Enrolling member {} in class {}", member_id, class_id);

        let membership_required_on = self.gym.require_active_membership.then(|| self.clock.today());
        let outcome = self
            .enrollment_repository
            .enroll(class_id, member_id, membership_required_on)
            .await?;

        match outcome {
            EnrollmentOutcome::Enrolled(enrollment) => {
                info!("Member {} enrolled in class {}", member_id, class_id);
                Ok(EnrollmentResponse::from(enrollment))
            }
            EnrollmentOutcome::ClassNotFound => Err(GymdeskError::not_found("Class", class_id)),
            EnrollmentOutcome::NotAMember => Err(GymdeskError::validation(format!(
                "User {member_id} is not a member"
            ))),
            EnrollmentOutcome::MembershipInactive => Err(GymdeskError::validation(
                "Member does not have an active membership",
            )),
            EnrollmentOutcome::AlreadyEnrolled => Err(GymdeskError::Conflict(
                "Member is already enrolled in this class".to_string(),
            )),
            EnrollmentOutcome::ClassFull { capacity } => {
                warn!("Class {} is full ({} seats)", class_id, capacity);
                Err(GymdeskError::Conflict("class is full".to_string()))
            }
        }
    }

    async fn unenroll(&self, principal: &Principal, class_id: ClassId, member_id: UserId) -> GymdeskResult<()> {
        debug!("Removing member {} from class {}", member_id, class_id);

        guards::owner_or_staff().check(principal, Some(member_id))?;

        if !self.enrollment_repository.unenroll(class_id, member_id).await? {
            return Err(GymdeskError::not_found("Enrollment", format!("{class_id}/{member_id}")));
        }

        info!("Member {} removed from class {}", member_id, class_id);
        Ok(())
    }

    async fn list_class_enrollments(
        &self,
        principal: &Principal,
        class_id: ClassId,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<EnrollmentResponse>> {
        principal.require_staff()?;

        if self.class_repository.find_by_id(class_id).await?.is_none() {
            return Err(GymdeskError::not_found("Class", class_id));
        }

        let enrollments = self.enrollment_repository.find_by_class(class_id, page).await?;
        Ok(PageResponse::from_page(enrollments, EnrollmentResponse::from))
    }

    async fn list_member_enrollments(
        &self,
        principal: &Principal,
        member_id: UserId,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<EnrollmentResponse>> {
        guards::owner_or_staff().check(principal, Some(member_id))?;

        let enrollments = self.enrollment_repository.find_by_member(member_id, page).await?;
        Ok(PageResponse::from_page(enrollments, EnrollmentResponse::from))
    }
}

impl std::fmt::Debug for EnrollmentServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrollmentServiceImpl")
            .field("gym", &self.gym)
            .finish_non_exhaustive()
    }
}
