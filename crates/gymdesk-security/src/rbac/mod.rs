//! Role-based access control.

mod checker;
mod principal;

pub use checker::*;
pub use principal::*;
