//! # Gymdesk Config
//!
//! Configuration management for Gymdesk.
//! Supports layered configuration from TOML files, a `.env` file and
//! `GYMDESK__*` environment variables.

mod app_config;
mod loader;
mod validation;

pub use app_config::*;
pub use loader::*;
pub use validation::*;
