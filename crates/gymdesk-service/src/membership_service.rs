//! Membership service.

use crate::dto::{
    CreateMembershipRequest, ExpireMembershipsResponse, MembershipResponse, RenewMembershipRequest,
    UpdateMembershipRequest,
};
use crate::mappers::PageResponse;
use crate::support::load_member;
use async_trait::async_trait;
use gymdesk_core::{
    Clock, GymdeskError, GymdeskResult, Membership, MembershipStatus, PageRequest, UserId, UserRole, ValidateExt,
};
use gymdesk_repository::{MembershipRepository, UserRepository};
use gymdesk_security::{guards, ClaimsExt, Principal};
use std::sync::Arc;
use tracing::{debug, info};

/// Membership service trait.
#[async_trait]
pub trait MembershipService: Send + Sync {
    /// Lists memberships by effective status (admin only).
    async fn list_memberships(
        &self,
        principal: &Principal,
        status: Option<MembershipStatus>,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<MembershipResponse>>;

    /// Gets a member's membership (self or admin).
    async fn get_membership(&self, principal: &Principal, user_id: UserId) -> GymdeskResult<MembershipResponse>;

    /// Opens the one membership a member may hold (admin only).
    async fn create_membership(
        &self,
        principal: &Principal,
        request: CreateMembershipRequest,
    ) -> GymdeskResult<MembershipResponse>;

    /// Changes type or status (admin only).
    async fn update_membership(
        &self,
        principal: &Principal,
        user_id: UserId,
        request: UpdateMembershipRequest,
    ) -> GymdeskResult<MembershipResponse>;

    /// Extends a membership by whole periods (admin only).
    async fn renew_membership(
        &self,
        principal: &Principal,
        user_id: UserId,
        request: RenewMembershipRequest,
    ) -> GymdeskResult<MembershipResponse>;

    /// Flags every overdue active membership as expired (admin only).
    async fn expire_overdue(&self, principal: &Principal) -> GymdeskResult<ExpireMembershipsResponse>;
}

/// Membership service implementation.
pub struct MembershipServiceImpl {
    membership_repository: Arc<dyn MembershipRepository>,
    user_repository: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl MembershipServiceImpl {
    pub fn new(
        membership_repository: Arc<dyn MembershipRepository>,
        user_repository: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            membership_repository,
            user_repository,
            clock,
        }
    }

    async fn load(&self, user_id: UserId) -> GymdeskResult<Membership> {
        self.membership_repository
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| GymdeskError::not_found("Membership", user_id))
    }
}

#[async_trait]
impl MembershipService for MembershipServiceImpl {
    async fn list_memberships(
        &self,
        principal: &Principal,
        status: Option<MembershipStatus>,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<MembershipResponse>> {
        debug!("Listing memberships, status: {:?}", status);

        principal.require_admin()?;

        let today = self.clock.today();
        let memberships = self.membership_repository.find_all(status, today, page).await?;
        Ok(PageResponse::from_page(memberships, |m| MembershipResponse::on(m, today)))
    }

    async fn get_membership(&self, principal: &Principal, user_id: UserId) -> GymdeskResult<MembershipResponse> {
        debug!("Getting membership of user: {}", user_id);

        guards::owner_or_admin().check(principal, Some(user_id))?;

        let membership = self.load(user_id).await?;
        Ok(MembershipResponse::on(membership, self.clock.today()))
    }

    async fn create_membership(
        &self,
        principal: &Principal,
        request: CreateMembershipRequest,
    ) -> GymdeskResult<MembershipResponse> {
        debug!("Creating {} membership for user: {}", request.membership_type, request.user_id);

        principal.require_admin()?;
        request.validate_request()?;

        load_member(self.user_repository.as_ref(), request.user_id).await?;
        if self.membership_repository.find_by_user(request.user_id).await?.is_some() {
            return Err(GymdeskError::Conflict(format!(
                "User {} already has a membership",
                request.user_id
            )));
        }

        let today = self.clock.today();
        let membership = Membership::start(
            request.user_id,
            request.membership_type,
            request.start_date.unwrap_or(today),
        )?;
        let saved = self.membership_repository.save(&membership).await?;

        info!("Membership created: {} until {}", saved.id, saved.expiry_date);
        Ok(MembershipResponse::on(saved, today))
    }

    async fn update_membership(
        &self,
        principal: &Principal,
        user_id: UserId,
        request: UpdateMembershipRequest,
    ) -> GymdeskResult<MembershipResponse> {
        debug!("Updating membership of user: {}", user_id);

        principal.require_admin()?;
        request.validate_request()?;

        let mut membership = self.load(user_id).await?;
        if let Some(membership_type) = request.membership_type {
            membership.membership_type = membership_type;
        }
        if let Some(status) = request.status {
            membership.status = status;
        }
        membership.updated_at = self.clock.now();

        let updated = self.membership_repository.update(&membership).await?;

        info!("Membership updated: {} ({})", updated.id, updated.status);
        Ok(MembershipResponse::on(updated, self.clock.today()))
    }

    async fn renew_membership(
        &self,
        principal: &Principal,
        user_id: UserId,
        request: RenewMembershipRequest,
    ) -> GymdeskResult<MembershipResponse> {
        debug!("Renewing membership of user: {}", user_id);

        principal.require_admin()?;
        request.validate_request()?;

        let today = self.clock.today();
        let renewed = self
            .membership_repository
            .renew(user_id, request.membership_type, request.periods, today)
            .await?
            .ok_or_else(|| GymdeskError::not_found("Membership", user_id))?;

        info!("Membership renewed: {} until {}", renewed.id, renewed.expiry_date);
        Ok(MembershipResponse::on(renewed, today))
    }

    async fn expire_overdue(&self, principal: &Principal) -> GymdeskResult<ExpireMembershipsResponse> {
        principal.require_role(UserRole::Admin)?;

        let expired = self.membership_repository.expire_overdue(self.clock.today()).await?;

        info!("Expired {} overdue memberships", expired);
        Ok(ExpireMembershipsResponse { expired })
    }
}

impl std::fmt::Debug for MembershipServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipServiceImpl").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use chrono::{Duration, NaiveDate};
    use gymdesk_core::{MembershipType, Payment, PaymentMethod};
    use gymdesk_core::Page;
    use gymdesk_repository::{MembershipRenewal, PaymentRepository};
    use mockall::mock;

    fn service(fx: &Fixture) -> MembershipServiceImpl {
        MembershipServiceImpl::new(Arc::clone(&fx.repos.memberships), Arc::clone(&fx.repos.users), fx.clock())
    }

    #[tokio::test]
    async fn test_create_membership_once_per_member() {
        let fx = Fixture::new();
        let memberships = service(&fx);
        let admin = fx.admin().await;
        let ana = fx.member_without_membership("ana@gym.test").await;

        let request = CreateMembershipRequest {
            user_id: ana.id,
            membership_type: MembershipType::Quarterly,
            start_date: None,
        };
        let created = memberships
            .create_membership(&Fixture::principal(&admin), request.clone())
            .await
            .unwrap();
        assert_eq!(created.start_date, Fixture::today());
        assert_eq!(created.expiry_date, NaiveDate::from_ymd_opt(2024, 9, 10).unwrap());
        assert_eq!(created.status, MembershipStatus::Active);

        let err = memberships
            .create_membership(&Fixture::principal(&admin), request)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[tokio::test]
    async fn test_create_membership_for_trainer_rejected() {
        let fx = Fixture::new();
        let memberships = service(&fx);
        let admin = fx.admin().await;
        let coach = fx.trainer("coach@gym.test").await;

        let request = CreateMembershipRequest {
            user_id: coach.user.id,
            membership_type: MembershipType::Monthly,
            start_date: None,
        };
        let err = memberships
            .create_membership(&Fixture::principal(&admin), request)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_get_membership_self_only() {
        let fx = Fixture::new();
        let memberships = service(&fx);
        let ana = fx.member("ana@gym.test").await;
        let bob = fx.member("bob@gym.test").await;

        let own = memberships.get_membership(&Fixture::principal(&ana), ana.id).await.unwrap();
        assert_eq!(own.days_remaining, 25);

        let err = memberships
            .get_membership(&Fixture::principal(&bob), ana.id)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_renew_extends_from_current_expiry() {
        let fx = Fixture::new();
        let memberships = service(&fx);
        let admin = fx.admin().await;
        let ana = fx.member("ana@gym.test").await;

        let request = RenewMembershipRequest {
            membership_type: None,
            periods: 2,
        };
        let renewed = memberships
            .renew_membership(&Fixture::principal(&admin), ana.id, request)
            .await
            .unwrap();
        // Started 2024-06-05, expired 2024-07-05, two more months.
        assert_eq!(renewed.expiry_date, NaiveDate::from_ymd_opt(2024, 9, 5).unwrap());
        assert_eq!(renewed.membership_type, MembershipType::Monthly);
    }

    #[tokio::test]
    async fn test_renew_and_paid_renewal_both_count() {
        let fx = Fixture::new();
        let memberships = service(&fx);
        let admin = fx.admin().await;
        let ana = fx.member("ana@gym.test").await;

        let mut payment = Payment::completed(ana.id, 4500, PaymentMethod::Card).unwrap();
        payment.membership_type = Some(MembershipType::Monthly);
        let renewal = MembershipRenewal {
            membership_type: MembershipType::Monthly,
            today: Fixture::today(),
        };
        let request = RenewMembershipRequest {
            membership_type: None,
            periods: 2,
        };

        let admin = Fixture::principal(&admin);
        let (renewed, paid) = tokio::join!(
            memberships.renew_membership(&admin, ana.id, request),
            fx.repos.payments.process(&payment, Some(renewal)),
        );
        renewed.unwrap();
        paid.unwrap();

        // 2024-07-05 plus two admin periods plus one paid period.
        let stored = fx.repos.memberships.find_by_user(ana.id).await.unwrap().unwrap();
        assert_eq!(stored.expiry_date, NaiveDate::from_ymd_opt(2024, 10, 5).unwrap());
    }

    #[tokio::test]
    async fn test_renew_without_membership_not_found() {
        let fx = Fixture::new();
        let memberships = service(&fx);
        let admin = fx.admin().await;
        let ana = fx.member_without_membership("ana@gym.test").await;

        let request = RenewMembershipRequest {
            membership_type: None,
            periods: 1,
        };
        let err = memberships
            .renew_membership(&Fixture::principal(&admin), ana.id, request)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_renew_cancelled_rejected() {
        let fx = Fixture::new();
        let memberships = service(&fx);
        let admin = fx.admin().await;
        let ana = fx.member("ana@gym.test").await;

        let cancel = UpdateMembershipRequest {
            membership_type: None,
            status: Some(MembershipStatus::Cancelled),
        };
        memberships
            .update_membership(&Fixture::principal(&admin), ana.id, cancel)
            .await
            .unwrap();

        let request = RenewMembershipRequest {
            membership_type: Some(MembershipType::Annual),
            periods: 1,
        };
        let err = memberships
            .renew_membership(&Fixture::principal(&admin), ana.id, request)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_expire_overdue_and_list_by_status() {
        let fx = Fixture::new();
        let memberships = service(&fx);
        let admin = fx.admin().await;
        fx.member("ana@gym.test").await;
        let bob = fx.member_without_membership("bob@gym.test").await;
        let lapsed = Membership::start(bob.id, MembershipType::Monthly, Fixture::today() - Duration::days(60)).unwrap();
        fx.repos.memberships.save(&lapsed).await.unwrap();

        let expired_view = memberships
            .list_memberships(
                &Fixture::principal(&admin),
                Some(MembershipStatus::Expired),
                PageRequest::first(),
            )
            .await
            .unwrap();
        assert_eq!(expired_view.items.len(), 1);
        assert_eq!(expired_view.items[0].user_id, bob.id);

        let swept = memberships.expire_overdue(&Fixture::principal(&admin)).await.unwrap();
        assert_eq!(swept.expired, 1);
        let swept = memberships.expire_overdue(&Fixture::principal(&admin)).await.unwrap();
        assert_eq!(swept.expired, 0);
    }

    mock! {
        Memberships {}

        #[async_trait]
        impl MembershipRepository for Memberships {
            async fn find_by_user(&self, user_id: UserId) -> GymdeskResult<Option<Membership>>;
            async fn find_all(
                &self,
                status: Option<MembershipStatus>,
                today: NaiveDate,
                page: PageRequest,
            ) -> GymdeskResult<Page<Membership>>;
            async fn save(&self, membership: &Membership) -> GymdeskResult<Membership>;
            async fn update(&self, membership: &Membership) -> GymdeskResult<Membership>;
            async fn renew(
                &self,
                user_id: UserId,
                membership_type: Option<MembershipType>,
                periods: u32,
                today: NaiveDate,
            ) -> GymdeskResult<Option<Membership>>;
            async fn expire_overdue(&self, today: NaiveDate) -> GymdeskResult<u64>;
            async fn count_by_status(&self, status: MembershipStatus, today: NaiveDate) -> GymdeskResult<u64>;
        }
    }

    #[tokio::test]
    async fn test_member_cannot_renew_and_store_is_untouched() {
        let fx = Fixture::new();
        let ana = fx.member("ana@gym.test").await;

        let mut repo = MockMemberships::new();
        repo.expect_renew().never();
        let memberships = MembershipServiceImpl::new(Arc::new(repo), Arc::clone(&fx.repos.users), fx.clock());

        let request = RenewMembershipRequest {
            membership_type: None,
            periods: 1,
        };
        let err = memberships
            .renew_membership(&Fixture::principal(&ana), ana.id, request)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_database_errors_propagate() {
        let fx = Fixture::new();
        let admin = fx.admin().await;

        let mut repo = MockMemberships::new();
        repo.expect_renew()
            .returning(|_, _, _, _| Err(GymdeskError::Database("Lock wait timeout exceeded".to_string())));
        repo.expect_find_all()
            .returning(|_, _, _| Err(GymdeskError::Database("connection reset".to_string())));
        let memberships = MembershipServiceImpl::new(Arc::new(repo), Arc::clone(&fx.repos.users), fx.clock());
        let admin = Fixture::principal(&admin);

        let request = RenewMembershipRequest {
            membership_type: None,
            periods: 1,
        };
        let err = memberships
            .renew_membership(&admin, UserId::new(), request)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 500);

        let err = memberships
            .list_memberships(&admin, None, PageRequest::first())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 500);
    }
}
