//! Tracing/logging initialization for the server binary.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub const fn from_json_flag(log_json: bool) -> Self {
        if log_json { Self::Json } else { Self::Pretty }
    }
}

/// Build the env-filter: `RUST_LOG` wins, then `default_filter`
/// (e.g. `"coursehub_server=info"`).
pub fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install the global tracing subscriber.
///
/// Returns an error when a global subscriber is already set.
pub fn init_tracing(
    default_filter: &str,
    format: LogFormat,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let registry = tracing_subscriber::registry().with(env_filter(default_filter));
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_selects_format() {
        assert_eq!(LogFormat::from_json_flag(true), LogFormat::Json);
        assert_eq!(LogFormat::from_json_flag(false), LogFormat::Pretty);
    }

    #[test]
    fn second_init_is_rejected() {
        let _ = init_tracing("coursehub_core=debug", LogFormat::Pretty);
        assert!(init_tracing("coursehub_core=debug", LogFormat::Json).is_err());
    }
}
