use thiserror::Error;

pub type LaunchResult<T> = Result<T, LaunchError>;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0} is an unidentified wing name")]
    InvalidWing(String),

    /// A service the whole run depends on (segment data, link shortener)
    /// is unreachable or answered with a non-success status.
    #[error("{service} unavailable: {reason}")]
    UpstreamUnavailable {
        service: &'static str,
        reason: String,
    },

    /// The SMS gateway rejected a single message.
    #[error("unable to send SMS to {phone}: {reason}")]
    SendFailed { phone: String, reason: String },

    #[error("Invalid tracking link: {0}")]
    TrackingLink(String),

    #[error("Unexpected failure: {0}")]
    Unexpected(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LaunchError {
    pub fn upstream(service: &'static str, reason: impl ToString) -> Self {
        LaunchError::UpstreamUnavailable {
            service,
            reason: reason.to_string(),
        }
    }

    /// Only a rejected send is skipped over; everything else ends the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LaunchError::SendFailed { .. })
    }
}

impl From<config::ConfigError> for LaunchError {
    fn from(err: config::ConfigError) -> Self {
        LaunchError::Config(format!(
            "{err}. Confirm if you have sourced your environment."
        ))
    }
}
