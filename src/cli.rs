//! Command-line interface definitions and parsing
//!
//! This module defines the CLI structure for ghx using the `clap` crate.
//!
//! # Commands
//!
//! - **issue edit**: apply one set of field edits to a range of issues
//! - **issue close / reopen**: change the state of a range of issues
//! - **label**: list or create repository labels
//! - **milestone**: list repository milestones
//! - **config**: read and update settings
//! - **completions**: print a shell completion script
//!
//! Global flags (`--repo`, `--format`, `-q`, `-v`) may appear anywhere on the
//! command line.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::config::OutputFormat;

/// Main CLI structure for parsing command-line arguments
#[derive(Parser, Debug)]
#[command(name = "ghx")]
#[command(about = "A companion to the GitHub CLI", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Repository to operate on (defaults to config, then the git origin)
    #[arg(short = 'R', long = "repo", value_name = "OWNER/REPO", global = true)]
    pub repo: Option<String>,

    /// Output format (overrides config)
    #[arg(long = "format", value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Suppress informational output (only print results)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Cli {
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Work with issues
    #[command(visible_alias = "i")]
    Issue {
        #[command(subcommand)]
        command: IssueCommands,
    },

    /// Work with repository labels
    #[command(visible_alias = "l")]
    Label {
        #[command(subcommand)]
        command: LabelCommands,
    },

    /// Work with repository milestones
    #[command(visible_alias = "m")]
    Milestone {
        #[command(subcommand)]
        command: MilestoneCommands,
    },

    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Issue subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum IssueCommands {
    /// Edit labels, assignees and milestone on a range of issues
    Edit(EditArgs),

    /// Close a range of issues
    Close(StateArgs),

    /// Reopen a range of issues
    Reopen(StateArgs),
}

/// Flags shared by every command that writes to many issues
#[derive(Args, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyArgs {
    /// Show what would change without editing anything
    #[arg(short = 'n', long = "dry-run")]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

/// Arguments for `ghx issue close` and `ghx issue reopen`
#[derive(Args, Debug, Clone)]
pub struct StateArgs {
    /// Issues to change, e.g. `42-50,53`
    #[arg(value_name = "RANGE")]
    pub range: String,

    #[command(flatten)]
    pub apply: ApplyArgs,
}

/// Arguments for `ghx issue edit`
#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    /// Issues to edit, e.g. `17-23,25`
    #[arg(value_name = "RANGE")]
    pub range: String,

    /// Add labels (repeatable, or comma-separated)
    #[arg(long = "add-label", value_name = "LABEL", value_delimiter = ',')]
    pub add_labels: Vec<String>,

    /// Remove labels (repeatable, or comma-separated)
    #[arg(long = "remove-label", value_name = "LABEL", value_delimiter = ',')]
    pub remove_labels: Vec<String>,

    /// Replace all labels; pass no value to clear them
    #[arg(
        long = "set-labels",
        value_name = "LABEL",
        value_delimiter = ',',
        num_args = 0..,
        conflicts_with_all = ["add_labels", "remove_labels"]
    )]
    pub set_labels: Option<Vec<String>>,

    /// Replace assignees (repeatable, or comma-separated)
    #[arg(long = "assignee", value_name = "LOGIN", value_delimiter = ',')]
    pub assignees: Vec<String>,

    /// Remove every assignee
    #[arg(long = "clear-assignees", conflicts_with = "assignees")]
    pub clear_assignees: bool,

    /// Milestone title or number; `none` clears it
    #[arg(long = "milestone", value_name = "MILESTONE")]
    pub milestone: Option<String>,

    #[command(flatten)]
    pub apply: ApplyArgs,
}

impl EditArgs {
    /// Assignee replacement requested on the command line, if any
    #[must_use]
    pub fn assignee_edit(&self) -> Option<Vec<String>> {
        if self.clear_assignees {
            Some(Vec::new())
        } else if self.assignees.is_empty() {
            None
        } else {
            Some(self.assignees.clone())
        }
    }
}

/// Label subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum LabelCommands {
    /// List every label in the repository
    #[command(visible_alias = "ls")]
    List,

    /// Create a label
    Create {
        /// Label name
        name: String,

        /// Hex color without `#`
        #[arg(short = 'c', long = "color", default_value = "ededed")]
        color: String,

        /// Label description
        #[arg(short = 'd', long = "description")]
        description: Option<String>,
    },
}

/// Milestone subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum MilestoneCommands {
    /// List every milestone in the repository, open and closed
    #[command(visible_alias = "ls")]
    List,
}

/// Configuration management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        /// Configuration key=value (e.g., default_repo=octo/widgets)
        #[arg(value_name = "KEY=VALUE")]
        setting: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key to retrieve (e.g., format)
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Print the config file location
    Path,
}
