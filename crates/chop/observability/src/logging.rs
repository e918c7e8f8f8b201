//! Tracing initialisation

use crate::error::{ObservabilityError, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging section of the operator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Install the global subscriber; `RUST_LOG` overrides the configured level
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    let installed = if config.json {
        subscriber
            .with(fmt::layer().json().with_target(true).with_line_number(true))
            .try_init()
    } else {
        subscriber.with(fmt::layer().with_target(true)).try_init()
    };
    installed.map_err(|e| ObservabilityError::TracingInit(e.to_string()))
}
