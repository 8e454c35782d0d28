//! Service implementations whose trait definitions live in the parent module
//! (e.g. `user_service.rs`).

pub mod class_service_impl;
pub mod payment_service_impl;
pub mod user_service_impl;

pub use class_service_impl::ClassServiceImpl;
pub use payment_service_impl::PaymentServiceImpl;
pub use user_service_impl::UserServiceImpl;
