use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rh_cli::commands::util::resolve_source;
use rh_cli::commands::{leave, punch};
use rh_cli::{Cli, Commands, Config, LeaveAction, PunchCommand, SourceCache};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut cache = SourceCache::new(config.delimiter);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Some(Commands::Leave(action)) => match action {
            LeaveAction::Calendar { file, year, month } => {
                let path = resolve_source(file.as_deref(), config.leave_source.as_deref(), "leave")?;
                leave::calendar(&mut out, &mut cache, &path, year.unwrap_or(config.year), *month)?;
            }
            LeaveAction::Day { file, date } => {
                let path = resolve_source(file.as_deref(), config.leave_source.as_deref(), "leave")?;
                leave::day(&mut out, &mut cache, &path, date)?;
            }
            LeaveAction::Occupancy { file, year, json } => {
                let path = resolve_source(file.as_deref(), config.leave_source.as_deref(), "leave")?;
                leave::occupancy(&mut out, &mut cache, &path, year.unwrap_or(config.year), *json)?;
            }
        },
        Some(Commands::Punch(PunchCommand::Report {
            file,
            year,
            month,
            json,
        })) => {
            let path = resolve_source(file.as_deref(), config.punch_source.as_deref(), "punch")?;
            punch::run(
                &mut out,
                &mut cache,
                &path,
                year.unwrap_or(config.year),
                *month,
                *json,
            )?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
