//! Logging setup
//!
//! The library only emits `tracing` events and spans:
//!
//! - `upload.validate` span around batch validation, `upload.store` around
//!   storage, both carrying the file count
//! - `debug` events for per-file steps (rule failures, sniffed media types)
//! - `info` events for stored files
//! - `warn` events for refused uploads and storage failures
//!
//! Applications that already install a subscriber need nothing from this
//! module. [`init`] is a ready-made one for everything else.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber
///
/// Sets up:
/// - JSON formatting (release) or pretty formatting (debug)
/// - Filtering from `RUST_LOG`, defaulting to `debug,acton_upload=trace`
///   in debug builds and `info` in release builds
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
///
/// # Example
///
/// ```rust,no_run
/// use acton_upload::observability;
///
/// # fn main() -> anyhow::Result<()> {
/// observability::init()?;
/// tracing::info!("Upload service started");
/// # Ok(())
/// # }
/// ```
pub fn init() -> anyhow::Result<()> {
    init_with(&ObservabilityConfig::default())
}

/// Installs the global subscriber, tagging events with the service name
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_with(config: &ObservabilityConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives()));

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?;
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    }

    tracing::debug!(service = %config.service_name, "Logging initialized");
    Ok(())
}

const fn default_directives() -> &'static str {
    if cfg!(debug_assertions) {
        "debug,acton_upload=trace"
    } else {
        "info"
    }
}

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Service name attached to the startup event
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "acton-upload".to_string(),
        }
    }
}

impl ObservabilityConfig {
    /// Create new observability config
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }
}
