//! Outbound campaign channels: tracking links, the link shortener, the
//! segmentation data source, the SMS gateway, and the campaign dispatcher
//! that drives them contact by contact.

pub mod dispatcher;
pub mod http;
pub mod progress;
pub mod segments;
pub mod shortener;
pub mod sms;
pub mod tracking;

pub use dispatcher::{CampaignDispatcher, CampaignRequest};
pub use progress::ProgressTracker;
pub use segments::{EdiSegmentSource, SegmentSource};
pub use shortener::{FirebaseShortener, LinkShortener};
pub use sms::{EngagementSmsGateway, SmsGateway};
