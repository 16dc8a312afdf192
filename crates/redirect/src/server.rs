//! Install-redirect HTTP server.

use crate::aware::{AwarenessMarker, EngagementAwarenessMarker};
use crate::pages::{store_page, ANDROID_EVENT, IOS_EVENT, OTHER_BROWSER_TEXT};
use crate::user_agent::{classify, OsFamily};
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use launch_core::config::RedirectConfig;
use launch_core::RedirectServiceConfig;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone)]
pub struct RedirectState {
    pub marker: Arc<dyn AwarenessMarker>,
    pub play_store_url: String,
    pub app_store_url: String,
}

#[derive(Debug, Deserialize)]
pub struct RedirectQuery {
    pub email: Option<String>,
}

pub async fn handle_redirect(
    State(state): State<RedirectState>,
    headers: HeaderMap,
    Query(query): Query<RedirectQuery>,
) -> Response {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let (event, store_link) = match classify(user_agent) {
        OsFamily::Android => (ANDROID_EVENT, state.play_store_url.as_str()),
        OsFamily::Ios => (IOS_EVENT, state.app_store_url.as_str()),
        OsFamily::Other => {
            metrics::counter!("redirect.visits", "os" => "other").increment(1);
            return OTHER_BROWSER_TEXT.into_response();
        }
    };
    metrics::counter!("redirect.visits", "os" => event).increment(1);

    if let Some(encoded) = query.email.as_deref().filter(|e| !e.is_empty()) {
        // The visitor still gets the store page if this fails.
        if let Err(e) = state.marker.mark_aware(encoded).await {
            warn!(error = %e, "Failed to mark contact as aware");
        }
    }

    Html(store_page(event, store_link)).into_response()
}

pub struct RedirectServer {
    config: RedirectConfig,
    marker: Arc<dyn AwarenessMarker>,
}

impl RedirectServer {
    pub fn new(config: RedirectConfig, marker: Arc<dyn AwarenessMarker>) -> Self {
        Self { config, marker }
    }

    /// Server backed by the engagement service's awareness endpoint.
    pub fn from_config(config: &RedirectServiceConfig) -> launch_core::LaunchResult<Self> {
        let http = launch_channels::http::client_with_timeout(config.http_timeout_secs)?;
        Ok(Self::new(
            config.redirect.clone(),
            Arc::new(EngagementAwarenessMarker::new(http, config)),
        ))
    }

    pub fn router(&self) -> Router {
        let state = RedirectState {
            marker: self.marker.clone(),
            play_store_url: self.config.play_store_url.clone(),
            app_store_url: self.config.app_store_url.clone(),
        };

        Router::new()
            .route("/", get(handle_redirect))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    pub async fn start_http(&self) -> anyhow::Result<()> {
        let addr = SocketAddr::new(self.config.host.parse()?, self.config.port);
        info!(addr = %addr, "Starting install-redirect server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}
