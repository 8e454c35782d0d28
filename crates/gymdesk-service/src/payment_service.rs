//! Payment service trait definition.

use crate::dto::{PaymentResponse, ProcessPaymentRequest, ProcessPaymentResponse, UpdatePaymentStatusRequest};
use crate::mappers::PageResponse;
use async_trait::async_trait;
use gymdesk_core::{GymdeskResult, PageRequest, PaymentId, UserId};
use gymdesk_repository::PaymentFilter;
use gymdesk_security::Principal;

/// Payment service trait.
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Records a completed payment and, when a membership type is given,
    /// renews the member's membership in the same transaction (admin only).
    async fn process_payment(
        &self,
        principal: &Principal,
        request: ProcessPaymentRequest,
    ) -> GymdeskResult<ProcessPaymentResponse>;

    /// Gets a payment (its member or an admin).
    async fn get_payment(&self, principal: &Principal, id: PaymentId) -> GymdeskResult<PaymentResponse>;

    /// Lists payments, newest first (admin only).
    async fn list_payments(
        &self,
        principal: &Principal,
        filter: PaymentFilter,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<PaymentResponse>>;

    /// Lists one member's payments (self or admin).
    async fn list_member_payments(
        &self,
        principal: &Principal,
        member_id: UserId,
        page: PageRequest,
    ) -> GymdeskResult<PageResponse<PaymentResponse>>;

    /// Moves a payment through its lifecycle (admin only).
    async fn update_status(
        &self,
        principal: &Principal,
        id: PaymentId,
        request: UpdatePaymentStatusRequest,
    ) -> GymdeskResult<PaymentResponse>;
}
