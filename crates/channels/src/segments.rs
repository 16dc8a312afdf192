//! Segment contacts from the segmentation data service.

use crate::http::{describe_failure, endpoint};
use async_trait::async_trait;
use launch_core::types::{Contact, Wing};
use launch_core::{LaunchConfig, LaunchError, LaunchResult};
use tracing::info;

const SERVICE: &str = "segment data";

#[async_trait]
pub trait SegmentSource: Send + Sync {
    /// Contacts currently in `segment`/`wing` that still need a message.
    /// An empty list is a normal answer, not an error.
    async fn fetch(&self, segment: &str, wing: Wing) -> LaunchResult<Vec<Contact>>;
}

pub struct EdiSegmentSource {
    http: reqwest::Client,
    url: String,
}

impl EdiSegmentSource {
    pub fn new(http: reqwest::Client, config: &LaunchConfig) -> Self {
        Self {
            http,
            url: endpoint(&config.edi_base_url, "marketing_data"),
        }
    }
}

#[async_trait]
impl SegmentSource for EdiSegmentSource {
    async fn fetch(&self, segment: &str, wing: Wing) -> LaunchResult<Vec<Contact>> {
        info!(segment, wing = %wing, "Fetching contacts from the marketing data table");
        let resp = self
            .http
            .get(&self.url)
            .query(&[("wing", wing.as_str()), ("segment", segment)])
            .send()
            .await
            .map_err(|e| LaunchError::upstream(SERVICE, e))?;

        if !resp.status().is_success() {
            return Err(LaunchError::upstream(SERVICE, describe_failure(resp).await));
        }

        // The service answers `null` once every contact has been messaged.
        let contacts: Option<Vec<Contact>> = resp
            .json()
            .await
            .map_err(|e| LaunchError::upstream(SERVICE, format!("malformed response: {e}")))?;
        Ok(contacts.unwrap_or_default())
    }
}
