//! # Logger
//!
//! Host-side wiring for the events Satchel emits through `tracing`. The Satchel crates
//! never install a subscriber themselves; an application calls [`Logger::builder`] once
//! at startup and keeps the returned [`Logger`] alive.
//!
//! Output is routed to the console, to a daily rolling file, or both. `RUST_LOG` sets
//! the baseline filter; [`LoggerBuilder::satchel_level`] and
//! [`LoggerBuilder::target_level`] add per-target overrides on top of it.
//!
//! ## Example
//!
//! ```rust
//! # use satchel_logger::{Logger, LevelFilter};
//!
//! let _logger = Logger::builder("my-app")
//!     .level(LevelFilter::WARN)
//!     .satchel_level(LevelFilter::DEBUG)
//!     .console()
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;

use private::Sealed;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Targets of the Satchel crates, as seen by `tracing` filters.
pub const SATCHEL_TARGETS: [&str; 2] = ["satchel", "satchel_storage"];

const KEPT_LOG_FILES: usize = 7;

/// Line format of the log file.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug)]
struct FileSink {
    dir: PathBuf,
    format: LogFormat,
}

/// No output chosen yet; [`LoggerBuilder::init`] is unavailable.
#[derive(Debug)]
pub struct Unrouted;
/// At least one output is configured.
#[derive(Debug)]
pub struct Routed;

mod private {
    pub trait Sealed {}
}
impl Sealed for Unrouted {}
impl Sealed for Routed {}

/// Collects filter and output settings for the global subscriber.
#[allow(private_bounds)]
#[derive(Debug)]
pub struct LoggerBuilder<S: Sealed = Unrouted> {
    name: String,
    level: LevelFilter,
    targets: Vec<(String, LevelFilter)>,
    console: bool,
    file: Option<FileSink>,
    route: PhantomData<S>,
}

#[allow(private_bounds)]
impl<S: Sealed> LoggerBuilder<S> {
    /// Baseline level when neither `RUST_LOG` nor a target override matches.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Overrides the level for one target (module path prefix).
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn target_level(mut self, target: impl Into<String>, level: LevelFilter) -> Self {
        self.targets.push((target.into(), level));
        self
    }

    /// Overrides the level for every Satchel crate.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn satchel_level(self, level: LevelFilter) -> Self {
        SATCHEL_TARGETS.iter().fold(self, |builder, target| builder.target_level(*target, level))
    }

    /// Writes compact, colored lines to stdout.
    pub fn console(self) -> LoggerBuilder<Routed> {
        LoggerBuilder { console: true, ..self.route() }
    }

    /// Writes to `<dir>/<name>.<date>.log`, rotated daily.
    pub fn file(self, dir: impl Into<PathBuf>, format: LogFormat) -> LoggerBuilder<Routed> {
        LoggerBuilder { file: Some(FileSink { dir: dir.into(), format }), ..self.route() }
    }

    fn route(self) -> LoggerBuilder<Routed> {
        LoggerBuilder {
            name: self.name,
            level: self.level,
            targets: self.targets,
            console: self.console,
            file: self.file,
            route: PhantomData,
        }
    }
}

impl LoggerBuilder<Routed> {
    /// Installs the global subscriber.
    ///
    /// # Errors
    /// - [`LoggerError::InvalidConfiguration`] for a blank name or target.
    /// - [`LoggerError::Io`] / [`LoggerError::Appender`] if the log directory is unusable.
    /// - [`LoggerError::Subscriber`] if a global subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        if self.name.trim().is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "Logger name cannot be empty".into(),
                context: None,
            });
        }

        let filter = self.filter()?;
        let mut layers = Vec::with_capacity(2);

        if self.console {
            layers.push(layer().compact().with_ansi(true).boxed());
        }

        let (guard, log_dir) = match self.file {
            Some(FileSink { dir, format }) => {
                fs::create_dir_all(&dir)
                    .context(format!("Failed to create log directory: {}", dir.display()))?;

                let appender = RollingFileAppender::builder()
                    .rotation(Rotation::DAILY)
                    .filename_prefix(&self.name)
                    .filename_suffix("log")
                    .max_log_files(KEPT_LOG_FILES)
                    .build(&dir)
                    .context(format!("Log directory {} rejected", dir.display()))?;

                let (writer, guard) = tracing_appender::non_blocking(appender);
                let file_layer = layer().with_writer(writer).with_ansi(false);
                layers.push(match format {
                    LogFormat::Json => file_layer.json().boxed(),
                    LogFormat::Text => file_layer.boxed(),
                });
                (Some(guard), Some(dir))
            },
            None => (None, None),
        };

        tracing_subscriber::registry().with(filter).with(layers).try_init()?;

        Ok(Logger { _guard: guard, log_dir })
    }

    fn filter(&self) -> Result<EnvFilter, LoggerError> {
        let base = EnvFilter::builder().with_default_directive(self.level.into()).from_env_lossy();

        self.targets.iter().try_fold(base, |filter, (target, level)| {
            Ok(filter.add_directive(directive(target, *level)?))
        })
    }
}

fn directive(target: &str, level: LevelFilter) -> Result<Directive, LoggerError> {
    if target.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Filter target cannot be empty".into(),
            context: None,
        });
    }

    format!("{target}={level}").parse().map_err(|e| LoggerError::InvalidConfiguration {
        message: format!("Invalid target '{target}': {e}").into(),
        context: None,
    })
}

/// The installed logging system.
///
/// Buffered file output is flushed when this handle drops, so hold it until shutdown.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    _guard: Option<WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl Logger {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder {
            name: name.into(),
            level: LevelFilter::INFO,
            targets: Vec::new(),
            console: false,
            file: None,
            route: PhantomData,
        }
    }

    /// Directory of the rolling log files, if file output is enabled.
    #[must_use]
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}
