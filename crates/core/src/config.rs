use crate::error::LaunchResult;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Root configuration, built once at process start from an optional
/// `launch.toml` and the process environment (no prefix, `__` separates
/// nested keys, e.g. `REDIRECT__PORT`). Components receive it explicitly.
#[derive(Debug, Clone, Deserialize)]
pub struct LaunchConfig {
    /// Engagement service root; SMS sends and Be.Well-aware marks go here.
    pub base_url: String,
    /// Segmentation data service root.
    pub edi_base_url: String,
    /// Landing page that receives the base64 `email` parameter.
    pub tracking_url_b: String,
    pub firebase_web_api_key: String,
    pub android_package_name: String,
    pub ios_bundle_id: String,
    pub domain_uri_prefix: String,
    /// Shortener endpoint; the API key is appended verbatim.
    pub firebase_dynamic_link_url: String,
    #[serde(default)]
    pub sms_auth_token: Option<String>,
    #[serde(default = "default_shortener_throttle_ms")]
    pub shortener_throttle_ms: u64,
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default)]
    pub redirect: RedirectConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedirectConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_play_store_url")]
    pub play_store_url: String,
    #[serde(default = "default_app_store_url")]
    pub app_store_url: String,
}

/// What the install-redirect server needs: the engagement service for
/// awareness marks and its own listener settings. Read from the same
/// sources as [`LaunchConfig`], but the campaign keys may be absent.
#[derive(Debug, Clone, Deserialize)]
pub struct RedirectServiceConfig {
    pub base_url: String,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default)]
    pub redirect: RedirectConfig,
}

// Default functions
fn default_shortener_throttle_ms() -> u64 {
    2000
}
fn default_progress_interval() -> usize {
    100
}
fn default_http_timeout_secs() -> u64 {
    30
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_play_store_url() -> String {
    "https://play.google.com/store/apps/details?id=com.savannah.bewell".to_string()
}
fn default_app_store_url() -> String {
    "https://apps.apple.com/ke/app/be-well-by-slade360/id1496576692".to_string()
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            play_store_url: default_play_store_url(),
            app_store_url: default_app_store_url(),
        }
    }
}

impl LaunchConfig {
    /// Load configuration from `launch.toml` (if present) and the process
    /// environment.
    pub fn load() -> LaunchResult<Self> {
        Self::from_sources(None)
    }

    /// Same as [`LaunchConfig::load`], but `env` stands in for the process
    /// environment when given.
    pub fn from_sources(env: Option<config::Map<String, String>>) -> LaunchResult<Self> {
        load_sources(env)
    }
}

impl RedirectServiceConfig {
    pub fn load() -> LaunchResult<Self> {
        Self::from_sources(None)
    }

    pub fn from_sources(env: Option<config::Map<String, String>>) -> LaunchResult<Self> {
        load_sources(env)
    }
}

fn load_sources<T: DeserializeOwned>(env: Option<config::Map<String, String>>) -> LaunchResult<T> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("launch").required(false))
        .add_source(
            config::Environment::default()
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

    let config = builder.build()?;
    Ok(config.try_deserialize()?)
}
