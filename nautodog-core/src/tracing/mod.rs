//! Tracing integration for structured logging
//!
//! This module configures the `tracing` subscriber used by the CLI and the
//! core library. The level filter sits behind a reload layer so that
//! [`init_tracing`] may be called more than once: later calls swap the
//! filter in place and leave the output sink untouched.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock};

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, reload};

/// Environment variable read by [`TracingLevel::from_env`]
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Global flag indicating whether tracing has been initialized
static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Handle used to swap the filter on re-initialization
static FILTER_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Configuration of the most recent successful initialization
static TRACING_CONFIG: Mutex<Option<TracingConfig>> = Mutex::new(None);

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to initialize tracing subscriber
    #[error("Failed to initialize tracing: {0}")]
    InitializationFailed(String),

    /// Invalid filter directive
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    /// Failed to create log file
    #[error("Failed to create log file: {0}")]
    FileCreationFailed(String),
}

/// Result type for tracing operations
pub type TracingResult<T> = Result<T, TracingError>;

/// Tracing log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingLevel {
    /// Error level - only errors
    Error,
    /// Warn level - errors and warnings
    Warn,
    /// Info level - errors, warnings, and info (default)
    #[default]
    Info,
    /// Debug level - all above plus debug messages
    Debug,
    /// Trace level - all messages including trace
    Trace,
}

impl TracingLevel {
    /// Converts to tracing crate's Level
    #[must_use]
    pub const fn to_tracing_level(self) -> Level {
        match self {
            Self::Error => Level::ERROR,
            Self::Warn => Level::WARN,
            Self::Info => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Parses a level name, falling back to `Info` for unknown values
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        value.trim().parse().unwrap_or_default()
    }

    /// Reads the level from `LOG_LEVEL`, defaulting to `Info`
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(LOG_LEVEL_ENV)
            .map(|v| Self::parse_lenient(&v))
            .unwrap_or_default()
    }

    /// Maps a `-v` count onto a level
    #[must_use]
    pub const fn from_verbosity(count: u8) -> Option<Self> {
        match count {
            0 => None,
            1 => Some(Self::Info),
            2 => Some(Self::Debug),
            _ => Some(Self::Trace),
        }
    }
}

impl std::str::FromStr for TracingLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "success" and "critical" are accepted for compatibility with
        // loguru-style LOG_LEVEL values
        match s.to_lowercase().as_str() {
            "error" | "critical" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" | "success" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for TracingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Output destination for tracing logs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TracingOutput {
    /// Output to stdout
    Stdout,
    /// Output to stderr
    #[default]
    Stderr,
    /// Output to a file (truncated on initialization)
    File {
        /// Path to the log file
        path: PathBuf,
    },
}

/// Line format of emitted events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingFormat {
    /// Human readable text
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Configuration for tracing initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Log level
    pub level: TracingLevel,
    /// Output destination
    pub output: TracingOutput,
    /// Event format
    pub format: TracingFormat,
    /// Whether to include thread ids in events
    pub thread_ids: bool,
    /// Custom filter string (overrides level if set)
    pub filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: TracingLevel::Info,
            output: TracingOutput::Stderr,
            format: TracingFormat::Text,
            thread_ids: false,
            filter: None,
        }
    }
}

impl TracingConfig {
    /// Creates a new tracing configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log level
    #[must_use]
    pub const fn with_level(mut self, level: TracingLevel) -> Self {
        self.level = level;
        self
    }

    /// Sets the output destination
    #[must_use]
    pub fn with_output(mut self, output: TracingOutput) -> Self {
        self.output = output;
        self
    }

    /// Sets the event format
    #[must_use]
    pub const fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets whether to include thread ids
    #[must_use]
    pub const fn with_thread_ids(mut self, include: bool) -> Self {
        self.thread_ids = include;
        self
    }

    /// Sets a custom filter string
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Builds the `EnvFilter` described by this configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the custom filter string does not parse.
    pub fn build_filter(&self) -> TracingResult<EnvFilter> {
        if let Some(ref custom_filter) = self.filter {
            EnvFilter::try_new(custom_filter)
                .map_err(|e| TracingError::InvalidFilter(e.to_string()))
        } else {
            // The `nautodog` prefix matches both the core library and the binary
            EnvFilter::try_new(format!("warn,nautodog={}", self.level))
                .map_err(|e| TracingError::InvalidFilter(e.to_string()))
        }
    }
}

type FilteredRegistry = Layered<reload::Layer<EnvFilter, Registry>, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

fn build_output_layer(config: &TracingConfig) -> TracingResult<BoxedLayer> {
    let base = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(config.thread_ids);

    let layer = match (&config.output, config.format) {
        (TracingOutput::Stdout, TracingFormat::Text) => base.with_writer(std::io::stdout).boxed(),
        (TracingOutput::Stdout, TracingFormat::Json) => {
            base.json().with_writer(std::io::stdout).boxed()
        }
        (TracingOutput::Stderr, TracingFormat::Text) => base.with_writer(std::io::stderr).boxed(),
        (TracingOutput::Stderr, TracingFormat::Json) => {
            base.json().with_writer(std::io::stderr).boxed()
        }
        (TracingOutput::File { path }, format) => {
            let file = std::fs::File::create(path).map_err(|e| {
                TracingError::FileCreationFailed(format!("{}: {e}", path.display()))
            })?;
            let writer = Mutex::new(file);
            match format {
                TracingFormat::Text => base.with_ansi(false).with_writer(writer).boxed(),
                TracingFormat::Json => base.json().with_ansi(false).with_writer(writer).boxed(),
            }
        }
    };
    Ok(layer)
}

/// Initializes the tracing subscriber with the given configuration
///
/// The first call installs the global subscriber. Subsequent calls only
/// replace the level filter; the output sink chosen by the first call stays
/// in place.
///
/// # Errors
///
/// Returns an error if:
/// - The filter string is invalid
/// - File output is configured but the file cannot be created
/// - Another global subscriber was installed outside this module
pub fn init_tracing(config: &TracingConfig) -> TracingResult<()> {
    let filter = config.build_filter()?;

    if let Some(handle) = FILTER_HANDLE.get() {
        handle
            .reload(filter)
            .map_err(|e| TracingError::InitializationFailed(e.to_string()))?;
        store_config(config);
        tracing::debug!(level = %config.level, "Tracing filter reloaded");
        return Ok(());
    }

    if TRACING_INITIALIZED.swap(true, Ordering::SeqCst) {
        // Another thread is mid-initialization; its subscriber wins.
        return Ok(());
    }

    let (filter_layer, handle) = reload::Layer::new(filter);
    let output_layer = match build_output_layer(config) {
        Ok(layer) => layer,
        Err(e) => {
            TRACING_INITIALIZED.store(false, Ordering::SeqCst);
            return Err(e);
        }
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(output_layer)
        .try_init()
        .map_err(|e| TracingError::InitializationFailed(e.to_string()))?;

    let _ = FILTER_HANDLE.set(handle);
    store_config(config);

    tracing::debug!(
        level = %config.level,
        format = ?config.format,
        "Tracing initialized"
    );

    Ok(())
}

fn store_config(config: &TracingConfig) {
    let mut guard = TRACING_CONFIG
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    *guard = Some(config.clone());
}

/// Checks if tracing has been initialized
#[must_use]
pub fn is_tracing_initialized() -> bool {
    TRACING_INITIALIZED.load(Ordering::SeqCst)
}

/// Gets the configuration of the most recent initialization
#[must_use]
pub fn get_tracing_config() -> Option<TracingConfig> {
    TRACING_CONFIG
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .clone()
}
