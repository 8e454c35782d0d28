//! # Gymdesk Server Library
//!
//! Wiring for the Gymdesk server binary: logging setup, startup output
//! and the [`app::Application`] that connects storage, services and the
//! HTTP router.

pub mod app;
pub mod startup;
pub mod telemetry;
