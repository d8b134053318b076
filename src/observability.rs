//! Tracing subscriber setup
//!
//! The library only emits `tracing` events. Applications that have no
//! subscriber of their own can install one here.
//!
//! ```rust,ignore
//! use llm_stream_client::observability::{init_subscriber, OutputFormat, SubscriberConfig};
//!
//! init_subscriber(SubscriberConfig {
//!     log_level: tracing::Level::DEBUG,
//!     output_format: OutputFormat::Json,
//! })?;
//! ```

use tracing_subscriber::EnvFilter;

use crate::error::LlmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonCompact,
}

#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub log_level: tracing::Level,
    pub output_format: OutputFormat,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            log_level: tracing::Level::INFO,
            output_format: OutputFormat::Text,
        }
    }
}

impl SubscriberConfig {
    pub fn debug() -> Self {
        Self {
            log_level: tracing::Level::DEBUG,
            ..Self::default()
        }
    }

    /// Read `LLM_STREAM_LOG_LEVEL` and `LLM_STREAM_LOG_FORMAT`.
    pub fn from_env() -> Result<Self, LlmError> {
        let mut config = Self::default();
        if let Ok(level) = std::env::var("LLM_STREAM_LOG_LEVEL") {
            config.log_level = parse_level(&level)?;
        }
        if let Ok(format) = std::env::var("LLM_STREAM_LOG_FORMAT") {
            config.output_format = parse_format(&format)?;
        }
        Ok(config)
    }
}

fn parse_level(level: &str) -> Result<tracing::Level, LlmError> {
    level.trim().parse().map_err(|_| {
        LlmError::ConfigurationError(format!(
            "Invalid log level: {level}. Valid options: trace, debug, info, warn, error"
        ))
    })
}

fn parse_format(format: &str) -> Result<OutputFormat, LlmError> {
    match format.trim().to_lowercase().as_str() {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        "json-compact" => Ok(OutputFormat::JsonCompact),
        _ => Err(LlmError::ConfigurationError(format!(
            "Invalid log format: {format}. Valid options: text, json, json-compact"
        ))),
    }
}

/// Filter used when `RUST_LOG` is unset.
fn default_filter(level: tracing::Level) -> String {
    let level = level.to_string().to_lowercase();
    format!("llm_stream_client={level}")
}

/// Install a global fmt subscriber. `RUST_LOG`, when set, overrides the
/// configured level. An already-installed subscriber is left in place.
pub fn init_subscriber(config: SubscriberConfig) -> Result<(), LlmError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config.log_level)));

    let init_result = match config.output_format {
        OutputFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init(),
        OutputFormat::JsonCompact => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .flatten_event(true)
            .try_init(),
        OutputFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    match init_result {
        Ok(()) => Ok(()),
        Err(e) if tracing::dispatcher::has_been_set() => {
            tracing::debug!(error = %e, "tracing subscriber already installed");
            Ok(())
        }
        Err(e) => Err(LlmError::ConfigurationError(format!(
            "Failed to initialize tracing: {e}"
        ))),
    }
}
