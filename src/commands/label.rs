//! Label commands

use std::io;

use colored::Colorize;

use crate::api;
use crate::config::OutputFormat;
use crate::output;
use crate::session::Session;
use crate::GhxError;

type Result<T> = std::result::Result<T, GhxError>;

/// Execute `ghx label list`
///
/// # Errors
/// Propagates API and output errors.
pub fn list(session: &Session, format: OutputFormat, quiet: bool) -> Result<()> {
    let mut labels = api::repo::list_labels(session.transport(), session.scope())?;
    labels.sort_by_key(|l| l.name.to_lowercase());

    if labels.is_empty() {
        if !quiet {
            println!("No labels found in {}.", session.scope());
        }
        return Ok(());
    }
    if !quiet && format == OutputFormat::Table {
        println!("Labels in {}:", session.scope());
    }
    output::write_labels(&mut io::stdout().lock(), &labels, format)
}

/// Execute `ghx label create`
///
/// # Errors
/// `GhxError::InvalidInput` for a malformed color; API errors otherwise,
/// including `Validation` when the label already exists.
pub fn create(
    session: &Session,
    name: &str,
    color: &str,
    description: Option<&str>,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GhxError::InvalidInput("Label name cannot be empty".into()));
    }
    let color = normalize_color(color)?;

    let mut resolver = session.resolver();
    let label = resolver.create_label(session.scope(), name, &color, description)?;

    if format == OutputFormat::Table {
        if !quiet {
            println!("Created label {} in {}", label.name.bold(), session.scope());
        }
        return Ok(());
    }
    output::write_labels(&mut io::stdout().lock(), std::slice::from_ref(&label), format)
}

/// Accept `d73a4a` or `#D73A4A`; the API wants six lowercase hex digits
fn normalize_color(color: &str) -> Result<String> {
    let color = color.trim().trim_start_matches('#');
    if color.len() == 6 && color.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(color.to_ascii_lowercase())
    } else {
        Err(GhxError::InvalidInput(format!(
            "Invalid color '{color}': expected six hex digits, e.g. d73a4a"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color("#D73A4A").unwrap(), "d73a4a");
        assert_eq!(normalize_color(" ededed ").unwrap(), "ededed");
        assert!(normalize_color("red").is_err());
        assert!(normalize_color("12345").is_err());
    }
}
