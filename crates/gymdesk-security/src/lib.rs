//! # Gymdesk Security
//!
//! JWT issuance and verification, password hashing and role-based access
//! checks for Gymdesk.

pub mod jwt;
pub mod password;
pub mod rbac;

pub use jwt::*;
pub use password::*;
pub use rbac::*;
