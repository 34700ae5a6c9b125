//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the signal handler,
//! opens the content source and runs one atomic write.

use anyhow::{Context, Result, anyhow, bail};
use std::fs::File;
use std::io::{self, Read};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use atomic_file::cli::Args;
use atomic_file::config::{create_template_config, load_config};
use atomic_file::output as out;
use atomic_file::{AtomicWriter, default_config_path};

use crate::logging::init_tracing;

/// Exit status used when interrupted, as shells do for SIGINT.
const EXIT_INTERRUPTED: i32 = 130;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle --print-config / --init-config before logging init
    if args.print_config {
        match default_config_path() {
            Some(p) => {
                out::print_info(&format!("atomic_file config path:\n  {}", p.display()));
                if p.exists() {
                    out::print_info("A config file exists at that location.");
                } else {
                    out::print_info(
                        "No config file exists there yet. Run with --init-config to create a template.",
                    );
                }
            }
            None => out::print_error("Could not determine a config path"),
        }
        return Ok(());
    }
    if args.init_config {
        let path =
            default_config_path().ok_or_else(|| anyhow!("could not determine a config path"))?;
        create_template_config(&path)?;
        out::print_success(&format!("A template config was written to: {}", path.display()));
        return Ok(());
    }

    // Config file first, then CLI overrides (CLI wins)
    let (mut cfg, cfg_path) = load_config()?;
    args.apply_overrides(&mut cfg);

    let guard_opt =
        init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
            out::print_error(&format!("Failed to initialize logging: {}", e));
            e
        })?;

    // Guard must be dropped on SIGINT to flush logs. The write itself cannot be
    // cancelled midway; an interrupted run may leave a `.<name>.*.tmp` sibling.
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            out::print_warn("Received interrupt; aborting");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
            std::process::exit(EXIT_INTERRUPTED);
        })
        .context("install signal handler")?;
    }

    debug!(config = ?cfg, config_file = ?cfg_path, "Starting atomic_file");

    let result = write_target(&args, &cfg);

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    result
}

fn write_target(args: &Args, cfg: &atomic_file::Config) -> Result<()> {
    let Some(target) = args.target.as_deref() else {
        bail!("missing TARGET");
    };

    let source: Box<dyn Read> = match args.source_file() {
        Some(p) => Box::new(
            File::open(p).with_context(|| format!("open source '{}'", p.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    };

    let mut writer = AtomicWriter::new(cfg.write_options());
    let outcome = writer.write(target, source);

    match outcome.error {
        None => {
            info!(target = %target.display(), "Write completed");
            Ok(())
        }
        Some(e) => {
            error!(
                code = e.code(),
                phase = e.phase(),
                target = %target.display(),
                error = %e,
                "Write failed; target left unchanged"
            );
            if let Some(leaked) = outcome.temp_path.as_deref() {
                out::print_warn(&format!(
                    "Temporary file could not be removed; delete it manually: {}",
                    leaked.display()
                ));
            }
            Err(e.into())
        }
    }
}
