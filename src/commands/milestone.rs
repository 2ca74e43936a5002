//! Milestone commands

use std::io;

use crate::api;
use crate::config::OutputFormat;
use crate::output;
use crate::session::Session;
use crate::GhxError;

type Result<T> = std::result::Result<T, GhxError>;

/// Execute `ghx milestone list`
///
/// # Errors
/// Propagates API and output errors.
pub fn list(session: &Session, format: OutputFormat, quiet: bool) -> Result<()> {
    let mut milestones = api::repo::list_milestones(session.transport(), session.scope())?;
    milestones.sort_by_key(|m| m.number);

    if milestones.is_empty() {
        if !quiet {
            println!("No milestones found in {}.", session.scope());
        }
        return Ok(());
    }
    if !quiet && format == OutputFormat::Table {
        println!("Milestones in {}:", session.scope());
    }
    output::write_milestones(&mut io::stdout().lock(), &milestones, format)
}
