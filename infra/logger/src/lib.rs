//! # Logger
//!
//! Installs the process-wide `tracing` subscriber used by every Stratus binary.
//!
//! * Console output (compact, ANSI) is on by default.
//! * [`LoggerBuilder::path`] adds a rolling, non-blocking file writer; keep the returned
//!   [`Logger`] alive so buffered lines are flushed on shutdown.
//! * [`LoggerBuilder::json`] switches every enabled output to JSON lines.
//! * `RUST_LOG` always wins over the programmatic defaults.
//!
//! ## Example
//!
//! ```rust
//! use stratus_logger::{LevelFilter, Logger};
//!
//! let _logger = Logger::builder()
//!     .name("stratus-server")
//!     .level(LevelFilter::DEBUG)
//!     .env_filter("stratus=debug,hyper=info")
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug)]
struct FileOutput {
    dir: PathBuf,
    rotation: Rotation,
    max_files: usize,
}

/// Fluent configuration for [`Logger`].
#[must_use = "The builder must be configured before it can be used to initialize the logger."]
#[derive(Debug)]
pub struct LoggerBuilder {
    name: String,
    console: bool,
    json: bool,
    level: LevelFilter,
    env_filter: Option<String>,
    file: Option<FileOutput>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            name: String::new(),
            console: true,
            json: false,
            level: LevelFilter::INFO,
            env_filter: None,
            file: None,
        }
    }
}

impl LoggerBuilder {
    /// Identifies the process; also used as the log file prefix (`<name>.<date>.log`).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub const fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Emits JSON lines instead of the compact human format.
    pub const fn json(mut self) -> Self {
        self.json = true;
        self
    }

    /// Default maximum level when `RUST_LOG` is not set.
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Programmatic directive string, e.g. `stratus_registration=debug`.
    ///
    /// An invalid directive makes [`LoggerBuilder::init`] fail.
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables the rolling file writer in `dir`.
    pub fn path(mut self, dir: impl Into<PathBuf>) -> Self {
        let file = self.file.take().unwrap_or(FileOutput {
            dir: PathBuf::new(),
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
        });
        self.file = Some(FileOutput { dir: dir.into(), ..file });
        self
    }

    /// Rotation policy for the file writer. Ignored without [`LoggerBuilder::path`].
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        if let Some(file) = self.file.as_mut() {
            file.rotation = rotation;
        }
        self
    }

    /// Number of rotated files to keep. Ignored without [`LoggerBuilder::path`].
    pub fn max_files(mut self, max_files: usize) -> Self {
        if let Some(file) = self.file.as_mut() {
            file.max_files = max_files;
        }
        self
    }

    /// Installs the global subscriber.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, `max_files == 0`, a bad
    ///   filter directive, or when no output is enabled.
    /// * [`LoggerError::Appender`] when the log directory cannot be used.
    /// * [`LoggerError::Subscriber`] when a global subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        self.validate()?;

        let filter = self.build_filter()?;
        let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);

        if self.console {
            let console = fmt::layer().with_ansi(true);
            layers.push(if self.json { console.json().boxed() } else { console.compact().boxed() });
        }

        let guard = match &self.file {
            Some(file) => {
                let (layer, guard) = self.file_layer(file)?;
                layers.push(layer);
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging output enabled; enable the console or a log path".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(layers).with(filter).try_init()?;

        Ok(Logger { guard })
    }

    fn validate(&self) -> Result<(), LoggerError> {
        if self.name.trim().is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "Logger name cannot be empty".into(),
                context: None,
            });
        }

        if self.file.as_ref().is_some_and(|file| file.max_files == 0) {
            return Err(LoggerError::InvalidConfiguration {
                message: "max_files must be greater than zero".into(),
                context: None,
            });
        }

        Ok(())
    }

    fn build_filter(&self) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder().with_default_directive(self.level.into());

        let Some(directives) = &self.env_filter else {
            return Ok(builder.from_env_lossy());
        };

        builder.parse(directives).map_err(|e| LoggerError::InvalidConfiguration {
            message: format!("Invalid env filter '{directives}': {e}").into(),
            context: None,
        })
    }

    fn file_layer(&self, file: &FileOutput) -> Result<(BoxedLayer, WorkerGuard), LoggerError> {
        fs::create_dir_all(&file.dir).map_err(|e| LoggerError::Internal {
            message: e.to_string().into(),
            context: Some(format!("Failed to create log directory {}", file.dir.display()).into()),
        })?;

        let appender = RollingFileAppender::builder()
            .rotation(file.rotation.clone())
            .filename_prefix(&self.name)
            .filename_suffix(LOG_FILE_SUFFIX)
            .max_log_files(file.max_files)
            .build(&file.dir)
            .context("Building rolling file appender")?;

        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_writer(writer).with_ansi(false);

        Ok((if self.json { layer.json().boxed() } else { layer.boxed() }, guard))
    }
}

/// Handle to the installed subscriber.
///
/// Holds the file writer guard; dropping it flushes and stops the background writer.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    /// Returns the file writer guard, if file output is enabled.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}
