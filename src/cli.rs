//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - SOURCE defaults to stdin; `-` also means stdin.
//! - --debug is a shorthand for --log-level debug.
//! - Mode flags accept octal (`644`, `0644`, `0o644`).

use clap::{Parser, ValueHint};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::types::{Config, LogLevel};
use crate::fs_ops::parse_mode;

/// Atomically replace TARGET with the bytes read from SOURCE (or stdin).
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Atomically replace a file's contents (temp file + fsync + rename)"
)]
pub struct Args {
    /// File to replace. Its directory must exist and be writable.
    #[arg(
        value_name = "TARGET",
        value_hint = ValueHint::FilePath,
        required_unless_present_any = ["print_config", "init_config"]
    )]
    pub target: Option<PathBuf>,

    /// Where to read the new content from; stdin when omitted or `-`.
    #[arg(value_name = "SOURCE", value_hint = ValueHint::FilePath)]
    pub source: Option<PathBuf>,

    /// Force this mode on the written file (highest precedence).
    #[arg(long, value_name = "OCTAL", value_parser = parse_mode)]
    pub mode: Option<u32>,

    /// Mode to use only when TARGET does not exist yet.
    #[arg(long, value_name = "OCTAL", value_parser = parse_mode)]
    pub default_mode: Option<u32>,

    /// Do not preserve an existing TARGET's mode.
    #[arg(long, help = "Do not preserve the existing file's permission bits")]
    pub no_keep_mode: bool,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(
        long,
        value_name = "LEVEL",
        value_parser = LogLevel::from_str,
        help = "Set log level: quiet, normal, info, debug"
    )]
    pub log_level: Option<LogLevel>,

    /// Also write logs to this file.
    #[arg(long, value_hint = ValueHint::FilePath, help = "Also write logs to this file")]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Print where atomic_file will look for the config file, then exit.
    #[arg(long, help = "Print the config file location and exit")]
    pub print_config: bool,

    /// Write a template config file at the config location, then exit.
    #[arg(long, help = "Create a template config file and exit")]
    pub init_config: bool,
}

impl Args {
    /// Source file to read, or `None` for stdin.
    pub fn source_file(&self) -> Option<&Path> {
        match self.source.as_deref() {
            Some(p) if p != Path::new("-") => Some(p),
            _ => None,
        }
    }

    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.clone()
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(p) = &self.log_file {
            cfg.log_file = Some(p.clone());
        }
        if let Some(m) = self.mode {
            cfg.file_mode = Some(m);
        }
        if let Some(m) = self.default_mode {
            cfg.default_file_mode = Some(m);
        }
        if self.no_keep_mode {
            cfg.keep_file_mode = false;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
