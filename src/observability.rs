use sentry::ClientInitGuard;
use sentry_tracing::EventFilter;
use tracing_subscriber::{
    EnvFilter,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::config::SentryConfig;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_DIRECTIVE: &str = "warn,dualring=info";

/// `RUST_LOG` if it parses, `default_directive` otherwise.
fn log_filter(rust_log: Option<String>, default_directive: &str) -> EnvFilter {
    rust_log
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive))
}

/// Install the global tracing subscriber, forwarding `ERROR` events to Sentry
/// when a DSN is configured. Logs go to stderr. Keep the returned guard alive
/// for the life of the process.
pub fn init_tracing_and_sentry(sentry_config: SentryConfig, default_directive: &str) -> Option<ClientInitGuard> {
    let guard = if sentry_config.dsn.is_empty() {
        None
    } else {
        Some(sentry::init((
            sentry_config.dsn,
            sentry::ClientOptions {
                release: Some(env!("CARGO_PKG_VERSION").into()),
                traces_sample_rate: sentry_config.sample_rate,
                ..Default::default()
            },
        )))
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true);

    let sentry_layer = sentry_tracing::layer().event_filter(|md| match md.level() {
        &tracing::Level::ERROR => EventFilter::Event,
        _ => EventFilter::Ignore,
    });

    tracing_subscriber::registry()
        .with(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok(), default_directive))
        .with(fmt_layer)
        .with(sentry_layer)
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_falls_back_to_default() {
        assert!(log_filter(None, DEFAULT_LOG_DIRECTIVE).to_string().contains("dualring=info"));
        assert_eq!(
            log_filter(Some("dualring=loud".to_string()), "dualring=debug").to_string(),
            "dualring=debug"
        );
    }

    #[test]
    fn test_log_filter_prefers_rust_log() {
        assert_eq!(log_filter(Some("dualring=trace".to_string()), DEFAULT_LOG_DIRECTIVE).to_string(), "dualring=trace");
    }
}
