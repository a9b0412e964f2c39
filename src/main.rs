//! ncsictl - NCSI profile switcher and connectivity checker
//!
//! Binary entry point for the ncsictl CLI application.

#![warn(clippy::all, warnings)]
#![warn(clippy::pedantic, clippy::nursery)]

use std::io::{self, Write};
use std::process::ExitCode;

use clap::CommandFactory;
use ncsictl::actions::{self, Console};
use ncsictl::cli::{Cli, Commands, OutputFormat};
use ncsictl::config::{ConfigLoader, Settings};
use ncsictl::error::Result;
use ncsictl::profile::BuiltinProfile;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Set up logging based on verbosity level.
///
/// # Arguments
///
/// * `verbose` - Enable debug-level logging
/// * `quiet` - Enable error-level only logging
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    } else if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().without_time().with_writer(io::stderr))
        .init();
}

/// Load settings, applying the command-line overrides.
fn load_settings(cli: &Cli) -> Result<Settings> {
    let settings = ConfigLoader::load(cli.config.as_deref())?;
    Ok(match &cli.store_file {
        Some(file) => settings.with_store_file(file.clone()),
        None => settings,
    })
}

fn build_console(settings: &Settings, format: OutputFormat, strict: bool) -> Result<Console> {
    Ok(Console::new(settings.profile_store()?, settings.verifier()?, format).strict(strict))
}

/// Print a built-in profile without touching the store.
fn show_builtin(builtin: BuiltinProfile, format: OutputFormat) -> Result<()> {
    let mut out = io::stdout().lock();
    if format == OutputFormat::Table {
        writeln!(out, "Built-in {builtin} profile")?;
    }
    actions::write_profile(&builtin.profile(), format, &mut out)
}

/// Run the selected command; returns whether it succeeded.
async fn run(cli: Cli) -> Result<bool> {
    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(true);
    }

    let settings = load_settings(&cli)?;
    tracing::debug!("Using {:?} store at {}", settings.store.backend, settings.store.key_path);

    match cli.command {
        Some(Commands::Show {
            builtin: Some(builtin),
        }) => {
            show_builtin(builtin, cli.format)?;
        }

        Some(Commands::Show { builtin: None }) => {
            let console = build_console(&settings, cli.format, false)?;
            console.show(&mut io::stdout().lock())?;
        }

        Some(Commands::Apply { profile, strict }) => {
            let console = build_console(&settings, cli.format, strict)?;
            console.apply(profile, &mut io::stdout().lock())?;
        }

        Some(Commands::Test) => {
            let console = build_console(&settings, cli.format, false)?;
            let report = console.test(&mut io::stdout()).await?;
            return Ok(report.all_passed());
        }

        Some(Commands::Menu) | None => {
            let console = build_console(&settings, cli.format, false)?;
            console.menu(io::stdin().lock(), &mut io::stdout()).await?;
        }

        Some(Commands::Completions { .. }) => {}
    }

    Ok(true)
}

/// Main entry point for the ncsictl CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = ncsictl::cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::debug!("Command failed: {e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
