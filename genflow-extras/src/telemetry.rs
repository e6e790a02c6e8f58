//! Tracing subscriber setup
//!
//! Subscriber setup for applications built on genflow. Only genflow's own
//! targets are enabled, at the configured level.
//!
//! ## Example
//!
//! ```rust,ignore
//! use genflow_extras::telemetry::{init_subscriber, OutputFormat, SubscriberConfig};
//!
//! let config = SubscriberConfig::builder()
//!     .log_level(tracing::Level::DEBUG)
//!     .output_format(OutputFormat::Json)
//!     .build();
//! let _guard = init_subscriber(config)?;
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::error::{ExtrasError, Result};

pub const LOG_LEVEL_ENV: &str = "GENFLOW_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "GENFLOW_LOG_FORMAT";
pub const LOG_FILE_ENV: &str = "GENFLOW_LOG_FILE";

/// Tracing targets enabled by the generated filter
const TARGETS: &[&str] = &[
    "genflow",
    "genflow_core",
    "genflow_registry",
    "genflow_provider_ollama",
    "genflow_provider_gemini",
    "genflow_extras",
];

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// How each log line is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain text
    #[default]
    Text,
    /// JSON, one object per event with span context
    Json,
    /// JSON with event fields flattened and no span context
    JsonCompact,
}

impl FromStr for OutputFormat {
    type Err = ExtrasError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "json-compact" => Ok(Self::JsonCompact),
            _ => Err(ExtrasError::TelemetryInit(format!(
                "Invalid log format: {s}. Valid options: text, json, json-compact"
            ))),
        }
    }
}

fn parse_level(level: &str) -> Result<tracing::Level> {
    tracing::Level::from_str(level).map_err(|_| {
        ExtrasError::TelemetryInit(format!(
            "Invalid log level: {level}. Valid options: trace, debug, info, warn, error"
        ))
    })
}

/// Level, encoding and destinations of genflow's logs
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub log_level: tracing::Level,
    pub output_format: OutputFormat,
    /// Write to stderr
    pub enable_console: bool,
    /// Also write to this file (non-blocking)
    pub log_file: Option<PathBuf>,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            log_level: tracing::Level::INFO,
            output_format: OutputFormat::Text,
            enable_console: true,
            log_file: None,
        }
    }
}

impl SubscriberConfig {
    pub fn builder() -> SubscriberConfigBuilder {
        SubscriberConfigBuilder::default()
    }

    pub fn debug() -> Self {
        Self {
            log_level: tracing::Level::DEBUG,
            ..Self::default()
        }
    }

    /// Configuration from `GENFLOW_LOG_LEVEL`, `GENFLOW_LOG_FORMAT` and `GENFLOW_LOG_FILE`
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();
        if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
            builder = builder.log_level_str(&level)?;
        }
        if let Ok(format) = std::env::var(LOG_FORMAT_ENV) {
            builder = builder.output_format(format.parse()?);
        }
        if let Ok(file_path) = std::env::var(LOG_FILE_ENV) {
            builder = builder.log_file(PathBuf::from(file_path));
        }
        Ok(builder.build())
    }

    /// `EnvFilter` directives enabling genflow's targets at the configured level
    pub fn filter_directives(&self) -> String {
        let level = self.log_level.as_str().to_lowercase();
        TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Debug, Default)]
pub struct SubscriberConfigBuilder {
    log_level: Option<tracing::Level>,
    output_format: Option<OutputFormat>,
    enable_console: Option<bool>,
    log_file: Option<PathBuf>,
}

impl SubscriberConfigBuilder {
    pub fn log_level(mut self, level: tracing::Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the log level from a string (`trace`, `debug`, `info`, `warn`, `error`)
    pub fn log_level_str(mut self, level: &str) -> Result<Self> {
        self.log_level = Some(parse_level(level)?);
        Ok(self)
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn enable_console(mut self, enable: bool) -> Self {
        self.enable_console = Some(enable);
        self
    }

    pub fn log_file(mut self, path: PathBuf) -> Self {
        self.log_file = Some(path);
        self
    }

    pub fn build(self) -> SubscriberConfig {
        SubscriberConfig {
            log_level: self.log_level.unwrap_or(tracing::Level::INFO),
            output_format: self.output_format.unwrap_or_default(),
            enable_console: self.enable_console.unwrap_or(true),
            log_file: self.log_file,
        }
    }
}

fn format_layer<W>(format: OutputFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true);
    match format {
        OutputFormat::Text => layer.boxed(),
        OutputFormat::Json => layer
            .json()
            .with_thread_ids(true)
            .with_thread_names(true)
            .boxed(),
        OutputFormat::JsonCompact => layer
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .boxed(),
    }
}

fn file_writer(path: &Path) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let file_name = path.file_name().ok_or_else(|| {
        ExtrasError::TelemetryInit(format!("Invalid log file path: {}", path.display()))
    })?;
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let appender = tracing_appender::rolling::never(directory, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

/// Initialize the global tracing subscriber.
///
/// Returns the file writer's guard when a log file is configured; keep it
/// alive for the duration of the program or buffered lines are lost. An
/// already-installed global subscriber is not an error.
pub fn init_subscriber(config: SubscriberConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(config.filter_directives())
        .map_err(|e| ExtrasError::TelemetryInit(format!("Invalid filter: {e}")))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if config.enable_console {
        layers.push(format_layer(config.output_format, std::io::stderr, true));
    }
    let mut guard = None;
    if let Some(path) = &config.log_file {
        let (writer, file_guard) = file_writer(path)?;
        layers.push(format_layer(config.output_format, writer, false));
        guard = Some(file_guard);
    }

    match tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
    {
        Ok(()) => Ok(guard),
        Err(e) if e.to_string().contains("already been set") => Ok(None),
        Err(e) => Err(ExtrasError::TelemetryInit(format!(
            "Failed to initialize tracing: {e}"
        ))),
    }
}

pub fn init_default() -> Result<Option<WorkerGuard>> {
    init_subscriber(SubscriberConfig::default())
}

/// Initialize from `GENFLOW_LOG_*` environment variables
pub fn init_from_env() -> Result<Option<WorkerGuard>> {
    init_subscriber(SubscriberConfig::from_env()?)
}
