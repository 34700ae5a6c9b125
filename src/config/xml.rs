//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Writes a commented template on request (`--init-config`), using the
//!   atomic writer itself.
//!
//! Notes:
//! - Unknown XML fields are a hard error to surface misconfigurations early.
//! - A missing default config is not an error; a missing explicit one is.

use anyhow::{Context, Result, anyhow, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::CONFIG_ENV;
use super::paths::{default_config_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use crate::fs_ops::{WriteOptions, parse_mode, write_bytes};
use crate::platform::set_dir_mode_0700;

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    log_level: Option<String>,
    log_file: Option<String>,
    file_mode: Option<String>,
    default_file_mode: Option<String>,
    keep_file_mode: Option<String>,
}

/// Trimmed, non-empty text of an optional element.
fn text(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

// Map XmlConfig -> Config, rejecting values we cannot interpret.
fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(s) = text(&parsed.log_level) {
        cfg.log_level = s.parse::<LogLevel>().map_err(|e| anyhow!(e))?;
    }
    if let Some(s) = text(&parsed.log_file) {
        cfg.log_file = Some(PathBuf::from(s));
    }
    if let Some(s) = text(&parsed.file_mode) {
        cfg.file_mode = Some(parse_mode(s).map_err(|e| anyhow!("file_mode: {e}"))?);
    }
    if let Some(s) = text(&parsed.default_file_mode) {
        cfg.default_file_mode =
            Some(parse_mode(s).map_err(|e| anyhow!("default_file_mode: {e}"))?);
    }
    if let Some(s) = text(&parsed.keep_file_mode) {
        cfg.keep_file_mode = parse_bool(s)
            .ok_or_else(|| anyhow!("keep_file_mode: expected true or false, got '{s}'"))?;
    }
    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_config(parsed).with_context(|| format!("invalid value in '{}'", path.display()))
}

/// Load the effective config.
///
/// Returns the config and the file it came from (`None` when built-in defaults
/// were used because the default config file does not exist).
pub fn load_config() -> Result<(Config, Option<PathBuf>)> {
    let explicit = env::var_os(CONFIG_ENV).is_some_and(|v| !v.is_empty());
    let Some(path) = default_config_path() else {
        debug!("No config directory available; using built-in defaults");
        return Ok((Config::default(), None));
    };

    if !path.exists() {
        if explicit {
            bail!(
                "{CONFIG_ENV} points to '{}', which does not exist",
                path.display()
            );
        }
        debug!(path = %path.display(), "No config file; using built-in defaults");
        return Ok((Config::default(), None));
    }

    let cfg = load_config_from_xml_path(&path)?;
    Ok((cfg, Some(path)))
}

const TEMPLATE: &str = r#"<!--
  atomic_file configuration (XML)

  Fields (all optional):
    log_level          -> quiet | normal | info | debug
    log_file           -> path to a log file (stdout/stderr still used)
    file_mode          -> octal mode forced on every written file, e.g. 0644
    default_file_mode  -> octal mode for files that do not exist yet
    keep_file_mode     -> true | false; keep an existing file's mode (default true)

  Notes:
    - CLI flags override XML values.
    - file_mode wins over keep_file_mode and default_file_mode.
-->
<config>
  <log_level>normal</log_level>
  <keep_file_mode>true</keep_file_mode>
</config>
"#;

/// Create the template config at `path`.
///
/// Refuses to overwrite an existing file or to write below a symlinked ancestor.
/// The file itself is written atomically with mode 0600.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        bail!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        );
    }
    if path.exists() {
        bail!("Config file already exists: {}", path.display());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create config directory '{}'", parent.display()))?;
            let _ = set_dir_mode_0700(parent);
        }
    }

    write_bytes(path, TEMPLATE, &WriteOptions::new().file_mode(0o600))
        .with_context(|| format!("write template config '{}'", path.display()))?;

    info!("Created template config at {}", path.display());
    Ok(())
}
