use auditai_core::LoggingConfig;
use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_TARGETS: [&str; 5] = [
    "auditai_api",
    "auditai_ai",
    "auditai_explorer",
    "auditai_core",
    "tower_http",
];

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

fn build_filter(level: &str) -> anyhow::Result<EnvFilter> {
    Ok(EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter(level)))?)
}

/// Plain subscriber for use before the configuration, and so the log format,
/// is known. Install it with `tracing::subscriber::with_default`.
pub fn bootstrap_subscriber() -> impl Subscriber + Send + Sync + 'static {
    let filter = build_filter("info").unwrap_or_else(|_| EnvFilter::new(default_filter("info")));
    fmt().compact().with_env_filter(filter).finish()
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = build_filter(&config.level)?;

    let fmt_layer = match config.format.as_str() {
        "json" => fmt::layer().json().boxed(),
        "compact" => fmt::layer().compact().boxed(),
        _ => fmt::layer().pretty().boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_workspace_crates() {
        let filter = default_filter("debug");
        assert!(filter.starts_with("auditai_api=debug,"));
        assert!(filter.ends_with("tower_http=debug"));
        assert!(EnvFilter::try_new(filter).is_ok());
    }

    #[test]
    fn test_bootstrap_subscriber_records_events() {
        let enabled = tracing::subscriber::with_default(bootstrap_subscriber(), || {
            tracing::enabled!(tracing::Level::ERROR)
        });
        assert!(enabled);
    }
}
