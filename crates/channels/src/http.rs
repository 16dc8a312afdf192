use launch_core::{LaunchConfig, LaunchError, LaunchResult};
use std::time::Duration;

/// Shared HTTP client for every outbound call of a run.
pub fn build_client(config: &LaunchConfig) -> LaunchResult<reqwest::Client> {
    client_with_timeout(config.http_timeout_secs)
}

pub fn client_with_timeout(timeout_secs: u64) -> LaunchResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LaunchError::Config(format!("failed to build HTTP client: {e}")))
}

/// Join a service root and a path, tolerating a missing or doubled slash.
pub fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Status line plus whatever body the service sent, for error messages.
pub async fn describe_failure(resp: reqwest::Response) -> String {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {body}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_join() {
        assert_eq!(
            endpoint("https://edi.example/", "marketing_data"),
            "https://edi.example/marketing_data"
        );
        assert_eq!(
            endpoint("https://edi.example", "/marketing_data"),
            "https://edi.example/marketing_data"
        );
    }
}
