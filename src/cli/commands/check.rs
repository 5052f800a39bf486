use colored::Colorize;

use crate::cli::output;
use crate::config::settings::Settings;
use crate::core::errors::{EnvsyncError, Result};
use crate::core::models::audit_entry::AuditAction;
use crate::core::services::check_service::{CheckService, Severity};

use super::audit_helpers::{AuditContext, log_audit};
use super::config_helpers::load_config;

/// Execute the `envsync check` command.
///
/// Reports dangling server references, missing global buckets and names
/// GitHub would reject. Fails when any error-level issue is found so it
/// can gate CI.
pub fn execute(settings: &Settings) -> Result<()> {
    let versioner = load_config(settings)?;
    let report = CheckService.check(versioner.document());

    output::header("🔍 envsync check");

    for issue in &report.issues {
        match issue.severity {
            Severity::Error => output::info(&format!("{} {issue}", "✗".red())),
            Severity::Warning => output::warning(&issue.to_string()),
        }
    }

    let summary = format!(
        "{} target(s) checked, {} error(s), {} warning(s)",
        report.targets,
        report.error_count(),
        report.warning_count()
    );

    log_audit(
        settings,
        AuditAction::Check,
        AuditContext {
            detail: Some(summary.clone()),
            state_hash: Some(versioner.fingerprint()),
            ..Default::default()
        },
    );

    if report.is_ok() {
        if report.issues.is_empty() {
            output::success(&format!("{summary}, all good"));
        } else {
            output::success(&summary);
        }
        Ok(())
    } else {
        Err(EnvsyncError::CheckFailed {
            errors: report.error_count(),
        })
    }
}
