//! Payment service implementation.

use crate::dto::{
    MembershipResponse, PaymentResponse, ProcessPaymentRequest, ProcessPaymentResponse, UpdatePaymentStatusRequest,
};
use crate::mappers::PageResponse;
use crate::payment_service::PaymentService;
use crate::support::load_member;
use async_trait::async_trait;
use gymdesk_core::{Clock, GymdeskError, GymdeskResult, PageRequest, Payment, PaymentId, UserId, ValidateExt};
use gymdesk_repository::{MembershipRenewal, PaymentFilter, PaymentRepository, UserRepository};
use gymdesk_security::{guards, ClaimsExt, Principal};
use std::sync::Arc;
use tracing::{debug, info};

/// Payment service implementation.
pub struct PaymentServiceImpl {
    payment_repository: Arc<dyn PaymentRepository>,
    user_repository: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl PaymentServiceImpl {
    pub fn new(
        payment_repository: Arc<dyn PaymentRepository>,
        user_repository: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            payment_repository,
            user_repository,
            clock,
        }
    }

    async fn load(&self, id: PaymentId) -> GymdeskResult<Payment> {
        self.payment_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| GymdeskError::not_found("Payment", id))
    }
}

#[async_trait]
impl PaymentService for PaymentServiceImpl {
    async fn process_payment(
        &self,
        principal: &Principal,
        request: ProcessPaymentRequest,
    ) -> GymdeskResult<ProcessPaymentResponse> {
        debug!(
            "Processing payment of {} cents for member {}",
            request.amount_cents, request.member_id
        );

        guards::payment_processing().check(principal, None)?;
        request.validate_request()?;

        load_member(self.user_repository.as_ref(), request.member_id).await?;

        let now = self.clock.now();
        let mut payment = Payment::completed(request.member_id, request.amount_cents, request.method)?;
        payment.membership_type = request.membership_type;
        payment.reference = request.reference;
        payment.notes = request.notes;
        payment.paid_at = now;
        payment.created_at = now;

        let renewal = request.membership_type.map(|membership_type| MembershipRenewal {
            membership_type,
            today: now.date_naive(),
        });
        let processed = self.payment_repository.process(&payment, renewal).await?;

        info!(
            "Payment processed: {} ({} cents, renewed membership: {})",
            processed.payment.id,
            processed.payment.amount_cents,
            processed.membership.is_some()
        );
        let today = self.clock.today();
        Ok(ProcessPaymentResponse {
            payment: PaymentResponse::from(processed.payment),
            membership: processed.membership.map(|m| MembershipResponse::on(m, today)),
        })
    }

    async fn get_payment(&self, principal: &Principal, id: PaymentId) -> GymdeskResult<PaymentResponse> {
        debug!("Getting payment: {}", id);

        let payment = self.load(id).await?;
        guards::owner_or_admin().check(principal, Some(payment.member_id))?;

        Ok(PaymentResponse::from(payment))
    }

    async fn list_payments(
        &self,
        principal: &Principal,
        filter: PaymentFilter,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<PaymentResponse>> {
        debug!("Listing payments, page: {}, size: {}", page.page, page.size);

        principal.require_admin()?;

        let payments = self.payment_repository.find_all(&filter, page).await?;
        Ok(PageResponse::from_page(payments, PaymentResponse::from))
    }

    async fn list_member_payments(
        &self,
        principal: &Principal,
        member_id: UserId,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<PaymentResponse>> {
        guards::owner_or_admin().check(principal, Some(member_id))?;

        let filter = PaymentFilter {
            member_id: Some(member_id),
            ..PaymentFilter::default()
        };
        let payments = self.payment_repository.find_all(&filter, page).await?;
        Ok(PageResponse::from_page(payments, PaymentResponse::from))
    }

    async fn update_status(
        &self,
        principal: &Principal,
        id: PaymentId,
        request: UpdatePaymentStatusRequest,
    ) -> GymdeskResult<PaymentResponse> {
        debug!("Updating payment {} to {}", id, request.status);

        principal.require_admin()?;

        let mut payment = self.load(id).await?;
        let previous = payment.status;
        payment.transition_to(request.status)?;
        let updated = self.payment_repository.update(&payment).await?;

        info!("Payment {} moved from {} to {}", id, previous, updated.status);
        Ok(PaymentResponse::from(updated))
    }
}

impl std::fmt::Debug for PaymentServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentServiceImpl").finish_non_exhaustive()
    }
}
