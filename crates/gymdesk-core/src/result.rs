//! Result type alias for Gymdesk.

use crate::GymdeskError;

/// A specialized `Result` type for Gymdesk operations.
pub type GymdeskResult<T> = Result<T, GymdeskError>;
