//! Marks a contact as aware of the app once they open a tracking link.

use async_trait::async_trait;
use launch_channels::http::{describe_failure, endpoint};
use launch_channels::tracking::decode_identifier;
use launch_core::{LaunchError, LaunchResult, RedirectServiceConfig};
use serde::Serialize;
use tracing::debug;

#[async_trait]
pub trait AwarenessMarker: Send + Sync {
    /// `encoded` is the base64 identifier exactly as it arrived in the link.
    async fn mark_aware(&self, encoded: &str) -> LaunchResult<()>;
}

#[derive(Serialize)]
struct AwareRequest<'a> {
    email: &'a str,
}

pub struct EngagementAwarenessMarker {
    http: reqwest::Client,
    url: String,
}

impl EngagementAwarenessMarker {
    pub fn new(http: reqwest::Client, config: &RedirectServiceConfig) -> Self {
        Self {
            http,
            url: endpoint(&config.base_url, "set_bewell_aware"),
        }
    }
}

#[async_trait]
impl AwarenessMarker for EngagementAwarenessMarker {
    async fn mark_aware(&self, encoded: &str) -> LaunchResult<()> {
        let email = decode_identifier(encoded)?;
        let resp = self
            .http
            .post(&self.url)
            .json(&AwareRequest { email: &email })
            .send()
            .await
            .map_err(|e| LaunchError::upstream("engagement", e))?;

        if !resp.status().is_success() {
            return Err(LaunchError::upstream("engagement", describe_failure(resp).await));
        }
        debug!(email = %email, "Contact marked Be.Well aware");
        Ok(())
    }
}
