//! Roster diagnostics bootstrap.
//!
//! # Responsibility
//! - Route `log` records from the roster engine into size-rotated files.
//! - Capture panics as a single flattened log line.
//!
//! # Invariants
//! - The backend starts at most once per process.
//! - Repeating `init_logging` with equal settings is a no-op; different
//!   settings are refused, never applied.
//! - Roster events carry ids and counts only; panic payloads are flattened
//!   and capped because they can echo participant names.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_BASENAME: &str = "tentroster";
const ROTATE_AT_BYTES: u64 = 4 * 1024 * 1024;
const KEPT_LOG_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 200;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Validated logger settings.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    level: LevelFilter,
    dir: PathBuf,
}

impl LogSettings {
    fn parse(level: &str, dir: &str) -> Result<Self, String> {
        Ok(Self {
            level: parse_level(level)?,
            dir: parse_dir(dir)?,
        })
    }

    fn level_name(&self) -> &'static str {
        match self.level {
            LevelFilter::Off => "off",
            LevelFilter::Error => "error",
            LevelFilter::Warn => "warn",
            LevelFilter::Info => "info",
            LevelFilter::Debug => "debug",
            LevelFilter::Trace => "trace",
        }
    }

    fn conflict_with(&self, requested: &LogSettings) -> Option<String> {
        if self.dir != requested.dir {
            return Some(format!(
                "roster logging already writes to `{}`; cannot move it to `{}`",
                self.dir.display(),
                requested.dir.display()
            ));
        }
        if self.level != requested.level {
            return Some(format!(
                "roster logging already runs at `{}`; cannot change it to `{}`",
                self.level_name(),
                requested.level_name()
            ));
        }
        None
    }
}

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Starts file logging at `level` under the absolute directory `log_dir`.
///
/// Accepted levels: `off|error|warn|info|debug|trace` (case-insensitive,
/// `warning` is an alias of `warn`).
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    let requested = LogSettings::parse(level, log_dir)?;
    let active = ACTIVE.get_or_try_init(|| start_backend(requested.clone()))?;
    match active.settings.conflict_with(&requested) {
        Some(conflict) => Err(conflict),
        None => Ok(()),
    }
}

/// `(level, log_dir)` of the running backend, if any.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (active.settings.level_name(), active.settings.dir.clone()))
}

/// Level used by hosts that do not pick one: `debug` in debug builds,
/// `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_backend(settings: LogSettings) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(&settings.dir)
        .map_err(|err| format!("cannot create `{}`: {err}", settings.dir.display()))?;

    let handle = Logger::try_with_str(settings.level_name())
        .map_err(|err| format!("rejected log level `{}`: {err}", settings.level_name()))?
        .log_to_file(
            FileSpec::default()
                .directory(settings.dir.as_path())
                .basename(LOG_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEPT_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("logger backend failed to start: {err}"))?;

    if PANIC_HOOK.set(()).is_ok() {
        install_panic_hook();
    }
    info!(
        "event=logging_started module=logging status=ok version={} level={} dir={}",
        env!("CARGO_PKG_VERSION"),
        settings.level_name(),
        settings.dir.display()
    );

    Ok(ActiveLogger {
        settings,
        _handle: handle,
    })
}

fn parse_level(level: &str) -> Result<LevelFilter, String> {
    let level = level.trim();
    if level.eq_ignore_ascii_case("warning") {
        return Ok(LevelFilter::Warn);
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| format!("unknown log level `{level}`; use off|error|warn|info|debug|trace"))
}

fn parse_dir(dir: &str) -> Result<PathBuf, String> {
    let dir = Path::new(dir.trim());
    if dir.as_os_str().is_empty() {
        return Err("log directory is blank".to_string());
    }
    if dir.is_relative() {
        return Err(format!(
            "log directory must be absolute: `{}`",
            dir.display()
        ));
    }
    Ok(dir.to_path_buf())
}

fn install_panic_hook() {
    let chained = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let location = panic
            .location()
            .map(|at| format!("{}:{}", at.file(), at.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic
            .payload()
            .downcast_ref::<&str>()
            .map(|text| (*text).to_string())
            .or_else(|| panic.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "<non-string payload>".to_string());
        error!(
            "event=panic module=logging status=error location={} payload={}",
            location,
            flatten_payload(&payload, PANIC_PAYLOAD_LIMIT)
        );
        chained(panic);
    }));
}

/// Single-line, at most `limit` characters plus an ellipsis marker.
fn flatten_payload(text: &str, limit: usize) -> String {
    let flat: String = text
        .chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect();
    match flat.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}
