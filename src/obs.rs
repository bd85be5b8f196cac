//! Tracing subscriber setup shared by the API server and the worker.

use crate::config::LogFormat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "gen_ai_on_aws=debug,tower_http=debug";

/// Installs the global subscriber. `RUST_LOG` overrides `default_filter`.
///
/// JSON output is meant for CloudWatch, where one event per line keeps
/// fields queryable.
pub fn init_tracing(format: LogFormat, default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("Tracing subscriber already installed: {}", e);
    }
}

/// Reads `LOG_FORMAT` before `Config` is loaded, so startup logs use the chosen format.
pub fn log_format_from_env() -> anyhow::Result<LogFormat> {
    LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref())
}
