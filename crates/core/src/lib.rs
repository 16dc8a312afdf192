//! Shared building blocks for the Be.Well launch tooling: configuration,
//! the error taxonomy, campaign domain types and the event sink used to
//! report campaign progress.

pub mod config;
pub mod error;
pub mod event_bus;
pub mod phone;
pub mod types;

pub use config::{LaunchConfig, RedirectServiceConfig};
pub use error::{LaunchError, LaunchResult};
