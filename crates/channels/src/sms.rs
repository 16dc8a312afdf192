//! Marketing SMS gateway on the engagement service.

use crate::http::{describe_failure, endpoint};
use async_trait::async_trait;
use launch_core::types::SmsPayload;
use launch_core::{LaunchConfig, LaunchError, LaunchResult};
use tracing::debug;

#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Send one message. Any failure comes back as
    /// [`LaunchError::SendFailed`] so the caller can skip the contact.
    async fn send(&self, payload: &SmsPayload) -> LaunchResult<()>;
}

pub struct EngagementSmsGateway {
    http: reqwest::Client,
    url: String,
    auth_token: Option<String>,
}

impl EngagementSmsGateway {
    pub fn new(http: reqwest::Client, config: &LaunchConfig) -> Self {
        Self {
            http,
            url: endpoint(&config.base_url, "send_marketing_sms"),
            // Tokens are sometimes exported with their JSON quotes.
            auth_token: config
                .sms_auth_token
                .as_deref()
                .map(|t| t.trim().trim_matches('"').to_string())
                .filter(|t| !t.is_empty()),
        }
    }
}

#[async_trait]
impl SmsGateway for EngagementSmsGateway {
    async fn send(&self, payload: &SmsPayload) -> LaunchResult<()> {
        let phone = payload.to.join(",");
        let mut req = self.http.post(&self.url).json(payload);
        if let Some(token) = &self.auth_token {
            req = req.header("Authorization", token);
        }

        let resp = req.send().await.map_err(|e| LaunchError::SendFailed {
            phone: phone.clone(),
            reason: e.to_string(),
        })?;

        if !resp.status().is_success() {
            return Err(LaunchError::SendFailed {
                phone,
                reason: describe_failure(resp).await,
            });
        }

        debug!(phone = %phone, "SMS accepted by gateway");
        Ok(())
    }
}
