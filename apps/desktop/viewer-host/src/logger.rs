//! Logging for the viewer host.
//!
//! Colored stdout plus a plain `viewer-host.log`, both with RFC 3339 timestamps. The global
//! logger can only be installed once per process; later calls are no-ops.

use crate::error::HostError;

use common::ErrorLocation;

use std::fmt::Arguments;
use std::fs::create_dir_all;
use std::io::stdout;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use fern::{Dispatch, FormatCallback};
use humantime::format_rfc3339;
use log::{LevelFilter, Record, info, warn};

static INIT_LOGGER_ONCE: Once = Once::new();

static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

pub const LOG_FILE_NAME: &str = "viewer-host.log";

const LOGGER_ALREADY_INITIALIZED_MESSAGE: &str = "Logger already initialized";

/// Crates whose debug output drowns the viewer's own logs.
const NOISY_DEPENDENCIES: [&str; 5] = ["hyper", "hyper_util", "reqwest", "notify", "mio"];

#[cfg(debug_assertions)]
const DEFAULT_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
const DEFAULT_LEVEL: LevelFilter = LevelFilter::Info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub log_dir: PathBuf,
    pub level: LevelFilter,
}

impl LogSettings {
    /// Build-profile default level, writing into `log_dir`.
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            level: DEFAULT_LEVEL,
        }
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn log_file_path(&self) -> PathBuf {
        self.log_dir.join(LOG_FILE_NAME)
    }
}

/// `<platform data dir>/snapshot-viewer/logs`, or `./logs` when there is none.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("snapshot-viewer").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Install the global logger.
///
/// Safe to call more than once: only the first call installs anything, later calls log a
/// warning and return `Ok`.
///
/// # Errors
///
/// Returns [`HostError::Host`] if the log directory or file cannot be created, or another
/// logger was installed by someone else.
pub fn initialize(settings: &LogSettings) -> Result<(), HostError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("{LOGGER_ALREADY_INITIALIZED_MESSAGE}");
        return Ok(());
    }

    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        result = install(settings);
        if result.is_ok() {
            info!(
                "Logger initialized with level {:?}, writing to {}",
                settings.level,
                settings.log_file_path().display()
            );
        }
    });

    result
}

#[track_caller]
fn install(settings: &LogSettings) -> Result<(), HostError> {
    create_log_dir(&settings.log_dir)?;

    let colors = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    let mut base_dispatch = Dispatch::new().level(settings.level);
    for dependency in NOISY_DEPENDENCIES {
        base_dispatch = base_dispatch.level_for(dependency, LevelFilter::Warn);
    }

    let stdout_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            write_line(out, colors.color(record.level()), message, record)
        })
        .chain(stdout());

    let log_file = fern::log_file(settings.log_file_path()).map_err(|e| HostError::Host {
        message: format!("Failed to create log file: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let file_dispatch = Dispatch::new()
        .format(|out, message, record| write_line(out, record.level(), message, record))
        .chain(log_file);

    base_dispatch
        .chain(stdout_dispatch)
        .chain(file_dispatch)
        .apply()
        .map_err(|e| HostError::Host {
            message: format!("Failed to initialize logger: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}

#[track_caller]
fn create_log_dir(log_dir: &Path) -> Result<(), HostError> {
    create_dir_all(log_dir).map_err(|e| HostError::Host {
        message: format!("Failed to create log directory {}: {e}", log_dir.display()),
        location: ErrorLocation::from(Location::caller()),
    })
}

fn write_line(
    out: FormatCallback,
    level: impl std::fmt::Display,
    message: &Arguments,
    record: &Record,
) {
    out.finish(format_args!(
        "[{date} - {level}] {message} [{file}:{line}]",
        date = format_rfc3339(SystemTime::now()),
        file = record.file().unwrap_or("unknown"),
        line = record.line().unwrap_or(0),
    ))
}
