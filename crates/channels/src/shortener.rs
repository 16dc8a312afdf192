//! Firebase Dynamic Links shortener.

use crate::http::describe_failure;
use async_trait::async_trait;
use launch_core::{LaunchConfig, LaunchError, LaunchResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "link shortener";

#[async_trait]
pub trait LinkShortener: Send + Sync {
    /// Return a short link that resolves to `long_link`.
    async fn shorten(&self, long_link: &str) -> LaunchResult<String>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShortLinkRequest<'a> {
    dynamic_link_info: DynamicLinkInfo<'a>,
    suffix: Suffix,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DynamicLinkInfo<'a> {
    domain_uri_prefix: &'a str,
    link: &'a str,
    android_info: AndroidInfo<'a>,
    ios_info: IosInfo<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AndroidInfo<'a> {
    android_package_name: &'a str,
    android_fallback_link: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IosInfo<'a> {
    ios_bundle_id: &'a str,
    ios_fallback_link: &'a str,
}

#[derive(Debug, Serialize)]
struct Suffix {
    option: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShortLinkResponse {
    short_link: String,
}

/// Shortens links through the Firebase REST API. The API is rate limited,
/// so every call is followed by a fixed pause.
pub struct FirebaseShortener {
    http: reqwest::Client,
    endpoint: String,
    domain_uri_prefix: String,
    android_package_name: String,
    ios_bundle_id: String,
    throttle: Duration,
}

impl FirebaseShortener {
    pub fn new(http: reqwest::Client, config: &LaunchConfig) -> Self {
        Self {
            http,
            endpoint: format!(
                "{}{}",
                config.firebase_dynamic_link_url, config.firebase_web_api_key
            ),
            domain_uri_prefix: config.domain_uri_prefix.clone(),
            android_package_name: config.android_package_name.clone(),
            ios_bundle_id: config.ios_bundle_id.clone(),
            throttle: Duration::from_millis(config.shortener_throttle_ms),
        }
    }

    fn request_body<'a>(&'a self, long_link: &'a str) -> ShortLinkRequest<'a> {
        ShortLinkRequest {
            dynamic_link_info: DynamicLinkInfo {
                domain_uri_prefix: &self.domain_uri_prefix,
                link: long_link,
                android_info: AndroidInfo {
                    android_package_name: &self.android_package_name,
                    android_fallback_link: long_link,
                },
                ios_info: IosInfo {
                    ios_bundle_id: &self.ios_bundle_id,
                    ios_fallback_link: long_link,
                },
            },
            suffix: Suffix { option: "SHORT" },
        }
    }
}

#[async_trait]
impl LinkShortener for FirebaseShortener {
    async fn shorten(&self, long_link: &str) -> LaunchResult<String> {
        let result = self.request_short_link(long_link).await;
        tokio::time::sleep(self.throttle).await;
        result
    }
}

impl FirebaseShortener {
    async fn request_short_link(&self, long_link: &str) -> LaunchResult<String> {
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&self.request_body(long_link))
            .send()
            .await
            .map_err(|e| LaunchError::upstream(SERVICE, e))?;

        if !resp.status().is_success() {
            return Err(LaunchError::upstream(SERVICE, describe_failure(resp).await));
        }

        let body: ShortLinkResponse = resp
            .json()
            .await
            .map_err(|e| LaunchError::upstream(SERVICE, format!("malformed response: {e}")))?;
        debug!(short_link = %body.short_link, "Link shortened");
        Ok(body.short_link)
    }
}
