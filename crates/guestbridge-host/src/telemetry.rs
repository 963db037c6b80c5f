//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LogFormat;
use crate::error::HostError;

/// Installs the global tracing subscriber. `RUST_LOG` selects the filter,
/// defaulting to `info`.
///
/// # Errors
///
/// Returns `HostError::Telemetry` if a global subscriber is already set.
pub fn init_tracing(format: LogFormat) -> Result<(), HostError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
    };
    result.map_err(|e| HostError::Telemetry(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_initialisation_is_an_error() {
        let _ = init_tracing(LogFormat::Json);

        let result = init_tracing(LogFormat::Pretty);

        assert!(matches!(result, Err(HostError::Telemetry(_))));
    }
}
