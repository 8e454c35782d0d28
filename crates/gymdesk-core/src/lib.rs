//! # Gymdesk Core
//!
//! Core types, domain model and error definitions for Gymdesk.
//! Every other crate in the workspace builds on the types exported here.

pub mod domain;
pub mod error;
pub mod id;
pub mod pagination;
pub mod result;
pub mod traits;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use pagination::*;
pub use result::*;
pub use traits::*;
pub use validation::*;
