use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogConfig;

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level. Returns `false` when a subscriber was already installed.
pub fn init(config: &LogConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if config.json {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .try_init()
    } else {
        fmt().with_env_filter(filter).with_target(false).try_init()
    };

    installed(result)
}

/// Subscriber for the CLI: writes to stderr so stdout stays clean for JSON output.
pub fn init_stderr(default_level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let result = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    installed(result)
}

fn installed(result: Result<(), Box<dyn std::error::Error + Send + Sync>>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!("Logging already initialised: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init(&LogConfig::default());
        assert!(!init(&LogConfig { level: "debug".to_string(), json: true }));
        assert!(!init_stderr("warn"));
    }

    #[test]
    fn test_repeated_stderr_init_reports_existing_subscriber() {
        init_stderr("warn");
        assert!(!init_stderr("debug"));
    }

    #[test]
    fn test_bad_level_falls_back() {
        init(&LogConfig { level: "not a [directive".to_string(), json: false });
    }
}
