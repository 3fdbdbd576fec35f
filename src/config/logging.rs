//! Tracing subscriber setup.

use crate::config::Settings;
use tracing_subscriber::EnvFilter;

/// The filter used when `RUST_LOG` is not set.
#[must_use]
pub fn default_directive(settings: &Settings) -> String {
    let level = if settings.debug {
        "debug".to_string()
    } else {
        settings.log_level.to_ascii_lowercase()
    };
    format!("{level},hyper=warn,sea_orm=warn,sqlx=warn")
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over settings.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(settings)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if settings.log_format_json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
