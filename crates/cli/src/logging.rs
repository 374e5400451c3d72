//! Tracing subscriber setup for the command line.
//!
//! Logs go to stderr so generated output on stdout stays clean.

use clap::ValueEnum;
use std::io;
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "warn")
    pub level: String,
    pub format: LogFormat,
    /// Overrides `level` when set; `RUST_LOG` overrides both
    pub env_filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
            env_filter: None,
        }
    }
}

impl LoggingConfig {
    /// `-v` enables info, `-vv` debug, `-vvv` and more trace
    pub fn from_verbosity(verbose: u8, format: LogFormat) -> Self {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        Self {
            level: level.to_string(),
            format,
            env_filter: None,
        }
    }

    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn filter_directive(&self) -> &str {
        self.env_filter.as_deref().unwrap_or(&self.level)
    }
}

pub fn init_logging(config: &LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.filter_directive()))?;

    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stderr).json())
            .try_init()?,
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stderr).with_target(false))
            .try_init()?,
    }

    Ok(())
}
