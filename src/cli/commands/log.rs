use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use colored::Colorize;

use crate::adapters::audit::json_audit_logger::JsonAuditLogger;
use crate::cli::output;
use crate::config::settings::Settings;
use crate::core::errors::{EnvsyncError, Result};
use crate::core::models::audit_entry::{AuditAction, AuditEntry};
use crate::core::traits::audit::AuditLogger;

/// Execute the `envsync log` command.
///
/// Displays the audit log with optional filters for repository, date,
/// and entry count.
pub fn execute(
    settings: &Settings,
    repository: Option<&str>,
    since: Option<&str>,
    last: Option<usize>,
) -> Result<()> {
    let log_path = settings
        .audit_log
        .as_deref()
        .unwrap_or(Path::new(".envsync/audit.log"));
    let logger = JsonAuditLogger::new(log_path);
    output::detail(&format!("Audit log: {}", logger.log_path().display()));

    // Parse the --since flag as a date
    let since_dt = since.map(parse_since).transpose()?;

    let entries = logger.query(repository, since_dt)?;

    if entries.is_empty() {
        output::header("envsync log");
        output::warning("No audit entries found");
        if repository.is_some() || since.is_some() {
            println!("  Try removing filters to see all entries.");
        }
        return Ok(());
    }

    // Apply --last N (take from the end)
    let skip = last.map_or(0, |n| entries.len().saturating_sub(n));
    let display = &entries[skip..];

    output::header(&format!("envsync log ({} entries)", display.len()));
    println!();

    for entry in display {
        print_entry(entry);
    }

    Ok(())
}

/// Parse a date string (ISO 8601: `YYYY-MM-DD`) into a UTC DateTime.
fn parse_since(s: &str) -> Result<DateTime<Utc>> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| EnvsyncError::InvalidArgument {
            detail: format!(
                "Invalid date format: '{s}'. Expected ISO 8601 (YYYY-MM-DD), e.g. 2026-01-15"
            ),
        })
        .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)))
}

/// Print a single audit entry as a formatted row.
fn print_entry(entry: &AuditEntry) {
    let date = entry.timestamp.format("%Y-%m-%d %H:%M:%S");
    let action = format_action(&entry.action);
    let target = match (&entry.repository, &entry.environment) {
        (Some(repo), Some(env)) => format!("{repo} [{env}]"),
        (Some(repo), None) => repo.clone(),
        _ => "-".dimmed().to_string(),
    };
    let hash = entry
        .state_hash
        .as_deref()
        .map(|h| h.get(..12).unwrap_or(h).to_string())
        .unwrap_or_default();
    let detail = entry.detail.as_deref().unwrap_or("");

    println!(
        "  {} {} {:<10} {} {} {}",
        date.to_string().dimmed(),
        "│".dimmed(),
        action,
        target,
        hash.dimmed(),
        detail.dimmed(),
    );
}

/// Format an AuditAction as a colored string.
fn format_action(action: &AuditAction) -> String {
    match action {
        AuditAction::Snapshot => "snapshot".cyan().to_string(),
        AuditAction::Plan => "plan".blue().to_string(),
        AuditAction::Apply => "apply".green().to_string(),
        AuditAction::Check => "check".yellow().to_string(),
    }
}
