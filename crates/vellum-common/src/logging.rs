//! Logging configuration and setup.

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Log output format.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// Human-readable format.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level.
    pub level: Level,
    /// Output format.
    pub format: LogFormat,
    /// Include source file location.
    pub include_location: bool,
    /// Include span events (enter, exit).
    pub include_span_events: bool,
    /// Custom filter string (e.g., "vellum_text=debug").
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            include_location: false,
            include_span_events: false,
            filter: None,
        }
    }
}

impl LogConfig {
    /// Create a debug configuration.
    pub fn debug() -> Self {
        Self {
            level: Level::DEBUG,
            include_location: true,
            include_span_events: true,
            ..Default::default()
        }
    }

    /// Set a custom filter.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Initialize logging with the given configuration.
///
/// Panics if a global subscriber is already installed; tests should use
/// [`init_test_logging`] instead.
pub fn init_logging(config: LogConfig) {
    // Build filter
    let filter = if let Some(ref custom_filter) = config.filter {
        EnvFilter::try_new(custom_filter)
            .unwrap_or_else(|_| EnvFilter::new(format!("{}", config.level)))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("{}", config.level)))
    };

    // Span events
    let span_events = if config.include_span_events {
        FmtSpan::ENTER | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    match config.format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .with_target(true)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_span_events(span_events);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_target(true)
                .with_span_events(span_events);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
    }
}

/// Initialize logging for tests.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_test_writer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.include_location);
    }

    #[test]
    fn test_log_config_debug() {
        let config = LogConfig::debug();
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.include_location);
    }

    #[test]
    fn test_log_config_with_filter() {
        let config = LogConfig::default().with_filter("vellum_text=debug");
        assert_eq!(config.filter, Some("vellum_text=debug".to_string()));
    }

    #[test]
    fn test_init_test_logging_is_idempotent() {
        init_test_logging();
        init_test_logging();
    }
}
