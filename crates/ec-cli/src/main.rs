use std::io::stdout;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ec_cli::commands::{build, events, ics, run};
use ec_cli::{Cli, Commands, Config};

/// Today's date in the configured timezone.
fn today_in(config: &Config) -> Result<NaiveDate> {
    let resolver_config = config
        .resolver_config()
        .context("invalid resolution settings")?;
    let now = Utc::now().with_timezone(&resolver_config.timezone);
    Ok(now.date_naive())
}

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
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut out = stdout().lock();
    match command {
        Commands::Build {
            history,
            workbook,
            today,
        } => {
            let today = today.map_or_else(|| today_in(&config), Ok)?;
            build::run(
                &mut out,
                &config,
                history.as_deref().unwrap_or(&config.history_path),
                workbook.as_deref().unwrap_or(&config.workbook_dir),
                today,
            )?;
        }
        Commands::Ics { input, output } => {
            let input = input
                .clone()
                .unwrap_or_else(|| config.next_per_ticker_path());
            ics::run(
                &mut out,
                &config,
                &input,
                output.as_deref().unwrap_or(&config.calendar_path),
                Utc::now(),
            )?;
        }
        Commands::Run { today } => {
            let today = today.map_or_else(|| today_in(&config), Ok)?;
            run::run(&mut out, &config, today, Utc::now())?;
        }
        Commands::Events { input } => {
            let input = input
                .clone()
                .unwrap_or_else(|| config.next_per_ticker_path());
            events::run(&mut out, &config, &input)?;
        }
    }

    Ok(())
}
