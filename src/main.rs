//! ghx CLI application entry point
//!
//! A companion to the official GitHub CLI covering operations it lacks,
//! chiefly editing many issues in one command.
//!
//! # Usage
//!
//! ```bash
//! # Add a label to issues 17 through 19 and 25
//! ghx issue edit 17-19,25 --add-label sprint/week1
//!
//! # Preview a milestone change without applying it
//! ghx issue edit 1-40 --milestone v1.0 --dry-run
//!
//! # Replace labels and clear the milestone, no prompt
//! ghx issue edit 3,5 --set-labels bug,triage --milestone none --yes
//!
//! # Close a run of issues, then reopen one of them
//! ghx issue close 40-45 --yes
//! ghx issue reopen 42
//!
//! # Labels and milestones of another repository, as CSV
//! ghx label list --repo octo/widgets --format csv
//! ghx milestone list
//!
//! # Settings
//! ghx config set default_repo=octo/widgets
//! ghx config get format
//! ```
//!
//! # Exit codes
//!
//! `0` on success, `1` on any error or when every issue in a bulk edit
//! failed, `2` when a bulk edit partially failed.
//!
//! # Configuration
//!
//! Settings live in the user's config directory
//! (`~/.config/ghx/config.toml` on Linux) and can be overridden with `GHX_*`
//! environment variables. Set `GHX_LOG` to control log output on stderr.

use std::io;
use std::process::ExitCode;

use clap::CommandFactory;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use ghx::{
    GhxError,
    api::types::IssueState,
    bulk::ReportStatus,
    cli::{Cli, Commands, ConfigCommands, IssueCommands, LabelCommands, MilestoneCommands},
    commands,
    config::GhxConfig,
    session::Session,
};

type Result<T> = std::result::Result<T, GhxError>;

/// Install the stderr log subscriber
///
/// `GHX_LOG` takes precedence; otherwise `-v` raises the default level.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "ghx=warn",
        1 => "ghx=info",
        _ => "ghx=debug",
    };
    let filter = EnvFilter::try_from_env("GHX_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Handle the config command - read or update a setting
///
/// # Errors
///
/// Returns `GhxError` for malformed input, unknown keys and failed saves.
fn handle_config_command(mut config: GhxConfig, command: &ConfigCommands, quiet: bool) -> Result<()> {
    match command {
        ConfigCommands::Set { setting } => {
            let (key, value) = setting.split_once('=').ok_or_else(|| {
                GhxError::InvalidInput("Invalid format. Use: ghx config set key=value".into())
            })?;
            let (key, value) = (key.trim(), value.trim());
            config.set(key, value)?;
            config.save()?;
            if !quiet {
                let shown = config.get(key).unwrap_or_default();
                println!("Set {key} = {shown}");
            }
        }
        ConfigCommands::Get { key } => {
            let value = config.get(key).ok_or_else(|| {
                GhxError::InvalidInput(format!(
                    "Unknown configuration key: '{key}'. Available keys: {}",
                    ghx::config::KEYS.join(", ")
                ))
            })?;
            println!("{value}");
        }
        ConfigCommands::Path => {
            println!("{}", GhxConfig::config_path()?.display());
        }
    }
    Ok(())
}

/// Dispatch a parsed command line
///
/// # Errors
///
/// Returns `GhxError` from configuration, session setup or the command.
fn run(cli: Cli) -> Result<ReportStatus> {
    let config = GhxConfig::load()?;
    let quiet = cli.quiet || config.quiet;
    let format = cli.format.unwrap_or(config.format);

    match &cli.command {
        Commands::Config { command } => {
            handle_config_command(config, command, quiet)?;
            return Ok(ReportStatus::Success);
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            return Ok(ReportStatus::Success);
        }
        _ => {}
    }

    let session = Session::connect(config, cli.repo.as_deref())?;
    match &cli.command {
        Commands::Issue { command } => match command {
            IssueCommands::Edit(args) => commands::issue::edit(&session, args, format, quiet),
            IssueCommands::Close(args) => {
                commands::issue::set_state(&session, args, IssueState::Closed, format, quiet)
            }
            IssueCommands::Reopen(args) => {
                commands::issue::set_state(&session, args, IssueState::Open, format, quiet)
            }
        },
        Commands::Label { command } => {
            match command {
                LabelCommands::List => commands::label::list(&session, format, quiet)?,
                LabelCommands::Create {
                    name,
                    color,
                    description,
                } => commands::label::create(
                    &session,
                    name,
                    color,
                    description.as_deref(),
                    format,
                    quiet,
                )?,
            }
            Ok(ReportStatus::Success)
        }
        Commands::Milestone {
            command: MilestoneCommands::List,
        } => {
            commands::milestone::list(&session, format, quiet)?;
            Ok(ReportStatus::Success)
        }
        Commands::Config { .. } | Commands::Completions { .. } => Ok(ReportStatus::Success),
    }
}

/// Main entry point for the ghx application
///
/// Parses arguments, sets up logging and maps the outcome to an exit code.
fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
