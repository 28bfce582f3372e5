//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `tentroster_core` linkage without a presentation layer.
//! - Optionally load a listing JSON file and print the normalized commit
//!   payload, exercising ingest validation end to end.
//!
//! Usage: `tentroster_cli [--log-dir <dir>] [listing.json]`

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tentroster_core::{
    default_log_level, init_logging, BoardConfig, ContainerListing, RosterBoard,
};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Args {
    log_dir: Option<PathBuf>,
    listing: Option<String>,
}

fn main() -> ExitCode {
    println!("tentroster_core ping={}", tentroster_core::ping());
    println!("tentroster_core version={}", tentroster_core::core_version());

    match run(std::env::args().skip(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("tentroster_cli: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(raw: impl Iterator<Item = String>) -> Result<(), String> {
    let args = parse_args(raw)?;
    if let Some(log_dir) = &args.log_dir {
        start_logging(log_dir)?;
    }
    if let Some(path) = &args.listing {
        println!("{}", render_listing(path)?);
    }
    Ok(())
}

fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut args = Args::default();
    while let Some(arg) = raw.next() {
        if arg == "--log-dir" {
            let dir = raw.next().ok_or("--log-dir needs a directory")?;
            args.log_dir = Some(PathBuf::from(dir));
        } else if arg.starts_with("--") {
            return Err(format!("unknown flag `{arg}`"));
        } else if args.listing.is_some() {
            return Err(format!("unexpected argument `{arg}`"));
        } else {
            args.listing = Some(arg);
        }
    }
    Ok(args)
}

fn start_logging(log_dir: &Path) -> Result<(), String> {
    // The core only accepts absolute log directories.
    let log_dir = if log_dir.is_absolute() {
        log_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|err| format!("resolve log dir: {err}"))?
            .join(log_dir)
    };
    let log_dir = log_dir
        .to_str()
        .ok_or_else(|| format!("log dir is not valid UTF-8: {}", log_dir.display()))?
        .to_string();
    init_logging(default_log_level(), &log_dir)
}

fn render_listing(path: &str) -> Result<String, String> {
    let text = std::fs::read_to_string(path).map_err(|err| format!("read `{path}`: {err}"))?;
    let listing: Vec<ContainerListing> =
        serde_json::from_str(&text).map_err(|err| format!("parse `{path}`: {err}"))?;
    let board = RosterBoard::from_listing(listing, Vec::new(), &BoardConfig::default())
        .map_err(|err| format!("load `{path}`: {err}"))?;
    board
        .commit_payload(Uuid::nil())
        .to_json()
        .map_err(|err| format!("serialize: {err}"))
}
