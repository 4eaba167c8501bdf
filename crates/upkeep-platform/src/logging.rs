use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[cfg(debug_assertions)]
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use simplelog::{CombinedLogger, Config, ConfigBuilder, LevelFilter, SharedLogger, WriteLogger};

use crate::paths::AppPaths;
use crate::settings::UpdateSettings;

/// Append-only log sink. If the file (or its directory) disappears while we
/// are running, the next write recreates it.
struct ReopeningLog {
    path: PathBuf,
    file: File,
}

impl ReopeningLog {
    fn open(path: &Path) -> io::Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            file: append_to(path)?,
        })
    }
}

impl Write for ReopeningLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.path.exists() {
            self.file = append_to(&self.path)?;
        }
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn append_to(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Drop the older half of the log once it grows past `limit` bytes, cutting
/// at the next line break. Returns whether anything was dropped.
fn keep_recent_half(path: &Path, limit: u64) -> io::Result<bool> {
    let len = match std::fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(error) => return Err(error),
    };
    if len <= limit {
        return Ok(false);
    }

    let contents = std::fs::read(path)?;
    let middle = contents.len() / 2;
    let start = contents[middle..]
        .iter()
        .position(|&byte| byte == b'\n')
        .map_or(middle, |newline| middle + newline + 1);
    std::fs::write(path, &contents[start..])?;
    Ok(true)
}

fn logger_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("upkeep")
        .build()
}

/// Install the global logger: the log file under the user data dir, plus the
/// terminal in debug builds. Verbosity follows `settings.debug_logging`.
pub fn init_logging(settings: &UpdateSettings) {
    let Ok(paths) = AppPaths::new() else {
        return;
    };
    install(&paths.log_file(), settings);
}

fn install(log_path: &Path, settings: &UpdateSettings) {
    let trimmed = keep_recent_half(log_path, settings.max_log_size_bytes);

    let mut sinks: Vec<Box<dyn SharedLogger>> = Vec::new();
    if let Ok(file) = ReopeningLog::open(log_path) {
        sinks.push(WriteLogger::new(LevelFilter::Debug, logger_config(), file));
    }
    #[cfg(debug_assertions)]
    sinks.push(TermLogger::new(
        LevelFilter::Debug,
        logger_config(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ));

    if !sinks.is_empty() && CombinedLogger::init(sinks).is_err() {
        log::debug!("A logger is already installed; keeping it");
    }
    set_logging_enabled(settings.debug_logging);

    match trimmed {
        Ok(true) => log::info!("Trimmed {} to its newest half", log_path.display()),
        Ok(false) => {}
        Err(error) => log::warn!("Could not trim {}: {error}", log_path.display()),
    }
    log::debug!("Logging to {}", log_path.display());
}

/// Switch debug output on or off at runtime.
pub fn set_logging_enabled(enabled: bool) {
    log::set_max_level(if enabled {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Off
    });
}
