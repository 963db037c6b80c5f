//! Guestbridge — host error types.

use guestbridge_core::error::DomainError;
use thiserror::Error;

/// Setup and runtime errors for a guest scope.
#[derive(Debug, Error)]
pub enum HostError {
    /// An environment variable or config value is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// A YAML config document could not be parsed.
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The tracing subscriber could not be installed.
    #[error("telemetry error: {0}")]
    Telemetry(String),

    /// An authoring use-case failed.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_converts_transparently() {
        let err: HostError = DomainError::EditInProgress.into();

        assert_eq!(err.to_string(), "an edit session is already in progress");
    }

    #[test]
    fn test_config_error_message() {
        let err = HostError::Config("GUESTBRIDGE_LOG_FORMAT must be json or pretty".to_owned());

        assert_eq!(
            err.to_string(),
            "configuration error: GUESTBRIDGE_LOG_FORMAT must be json or pretty"
        );
    }
}
