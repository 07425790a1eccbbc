//! Tracing setup for the gateway binary
//!
//! `RUST_LOG` takes precedence; the configured level is the fallback.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{LogFormat, LoggingConfig};

pub fn init_logging(config: &LoggingConfig) {
    let registry = tracing_subscriber::registry().with(level_filter(&config.level));

    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_span_events(FmtSpan::CLOSE))
            .init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init(),
    }

    tracing::info!(level = %config.level, format = ?config.format, "Gateway logging ready");
}

fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter_honors_configured_level() {
        let config = LoggingConfig::default();
        let filter = level_filter(&config.level);
        assert!(!filter.to_string().is_empty());
    }
}
