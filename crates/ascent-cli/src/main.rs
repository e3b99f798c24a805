//! Ascent CLI - Command-line interface for the skill progression ledger.

use anyhow::Context;
use ascent_cli::commands;
use ascent_cli::{Cli, Command, Config, Formatter};
use ascent_engine::ProgressionEngine;
use ascent_store::SqliteStore;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => PathBuf::from(path),
        None => Config::path()?,
    };

    if let Command::Init { force } = cli.command {
        if config_path.exists() && !force {
            anyhow::bail!("{} already exists (use --force to overwrite)", config_path.display());
        }
        Config::default().save_to(&config_path)?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }

    let mut config = Config::load_from(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Some(database) = cli.database {
        config.database_path = PathBuf::from(database);
    }

    // Logs go to stderr so JSON output stays machine-readable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut store = SqliteStore::with_busy_timeout(&config.database_path, config.busy_timeout())
        .with_context(|| format!("opening {}", config.database_path.display()))?;
    let mut engine = ProgressionEngine::new(config.engine.clone())?;

    let result = match cli.command {
        Command::Award(args) => commands::execute_award(args, &mut engine, &mut store, &formatter),
        Command::Submit(args) => commands::execute_submit(args, &mut engine, &mut store, &formatter),
        Command::Grade(args) => commands::execute_grade(args, &mut engine, &mut store, &formatter),
        Command::Breakthrough(args) => {
            commands::execute_breakthrough(args, &mut engine, &mut store, &formatter)
        }
        Command::Prime(args) => commands::execute_prime(args, &mut engine, &mut store, &formatter),
        Command::Ledger(args) => commands::execute_ledger(args, &mut engine, &mut store, &formatter),
        Command::Import(args) => commands::execute_import(args, &mut store, &formatter),
        Command::Init { .. } => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("{}", formatter.error(&e.to_string()));
        std::process::exit(1);
    }

    tracing::debug!(metrics = %engine.metrics().summary(), "done");
    Ok(())
}
