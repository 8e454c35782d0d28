//! Application state for Axum handlers.

use gymdesk_service::Services;

/// Shared application state.
#[derive(Clone, Debug)]
pub struct AppState {
    pub services: Services,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}
