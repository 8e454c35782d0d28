//! # Gymdesk REST
//!
//! Axum HTTP surface for Gymdesk: controllers, extractors, middleware, the
//! JSON envelope and the OpenAPI document.
//!
//! Every route under `/api/v1` runs behind the bearer-token middleware; the
//! handlers pull the caller out with [`extractors::AuthenticatedUser`] and
//! hand it to the service layer, which makes the access decisions.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
