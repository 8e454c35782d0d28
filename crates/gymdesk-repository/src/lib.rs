//! # Gymdesk Repository
//!
//! Data access for Gymdesk.
//!
//! ```text
//! Service
//!   ↓  Arc<dyn ClassRepository>   (domain interface, traits.rs)
//! MySqlClassRepository            (SQLx implementation, mysql/)
//!   ↓
//! MySQL
//! ```
//!
//! The `memory` feature adds a [`memory::MemoryStore`] that implements every
//! repository trait over in-process tables, used by the service and HTTP
//! tests.

pub mod mysql;
pub mod pool;
pub mod registry;
pub mod traits;

#[cfg(any(test, feature = "memory"))]
pub mod memory;

pub use mysql::*;
pub use pool::*;
pub use registry::*;
pub use traits::*;
