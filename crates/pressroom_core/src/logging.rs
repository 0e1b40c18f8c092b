//! Process-wide logging bootstrap.
//!
//! # Responsibility
//! - Start rolling file logs once per process.
//! - Capture panics as sanitized log events.
//!
//! # Invariants
//! - Repeating `init_logging` with identical settings is a no-op.
//! - Re-initialization with a different level or directory is rejected.
//! - Initialization never panics.
//! - Events carry metadata only; article text and filter values are not logged.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "pressroom";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    level: &'static str,
    dir: PathBuf,
}

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Starts file logging at `level` under `log_dir`.
///
/// # Errors
/// - `level` is not one of `trace|debug|info|warn|error`.
/// - `log_dir` is not absolute or cannot be created.
/// - Logging is already active with different settings.
/// - The logger backend fails to start.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), String> {
    let requested = LogSettings {
        level: normalize_level(level)?,
        dir: normalize_log_dir(log_dir)?,
    };

    let active = ACTIVE_LOGGER.get_or_try_init(|| start_logger(&requested))?;
    ensure_same_settings(&active.settings, &requested)
}

/// Returns `(level, log_dir)` of the active logger, if any.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE_LOGGER
        .get()
        .map(|active| (active.settings.level, active.settings.dir.clone()))
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(settings: &LogSettings) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(&settings.dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            settings.dir.display()
        )
    })?;

    let handle = Logger::try_with_str(settings.level)
        .map_err(|err| format!("invalid log level `{}`: {err}", settings.level))?
        .log_to_file(
            FileSpec::default()
                .directory(settings.dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    install_panic_hook_once();
    info!(
        "event=logging_init module=core status=ok level={} log_dir={} version={}",
        settings.level,
        settings.dir.display(),
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        settings: settings.clone(),
        _handle: handle,
    })
}

fn ensure_same_settings(active: &LogSettings, requested: &LogSettings) -> Result<(), String> {
    if active.dir != requested.dir {
        return Err(format!(
            "logging already initialized at `{}`; refusing to switch to `{}`",
            active.dir.display(),
            requested.dir.display()
        ));
    }
    if active.level != requested.level {
        return Err(format!(
            "logging already initialized with level `{}`; refusing to switch to `{}`",
            active.level, requested.level
        ));
    }
    Ok(())
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}

fn normalize_log_dir(log_dir: &Path) -> Result<PathBuf, String> {
    if log_dir.as_os_str().is_empty() {
        return Err("log_dir cannot be empty".to_string());
    }
    if !log_dir.is_absolute() {
        return Err(format!(
            "log_dir must be an absolute path, got `{}`",
            log_dir.display()
        ));
    }
    Ok(log_dir.to_path_buf())
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.set(()).is_err() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location,
            panic_payload_summary(panic_info)
        );
        previous_hook(panic_info);
    }));
}

fn panic_payload_summary(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = info
        .payload()
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| info.payload().downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());

    sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
}

// Payloads may echo user input; keep them on one line and bounded.
fn sanitize_message(value: &str, max_chars: usize) -> String {
    let single_line = value.replace(['\n', '\r'], " ");
    let mut truncated = single_line.chars().take(max_chars).collect::<String>();
    if single_line.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}
