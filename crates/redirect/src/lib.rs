//! Install-redirect page: sends phone visitors to the right app store and
//! marks the contact in the link as Be.Well aware.

pub mod aware;
pub mod pages;
pub mod server;
pub mod user_agent;

pub use aware::{AwarenessMarker, EngagementAwarenessMarker};
pub use server::RedirectServer;
pub use user_agent::OsFamily;
