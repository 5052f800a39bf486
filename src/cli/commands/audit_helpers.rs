use std::process::Command;

use chrono::Utc;

use crate::adapters::audit::json_audit_logger::JsonAuditLogger;
use crate::cli::output;
use crate::config::settings::Settings;
use crate::core::models::audit_entry::{AuditAction, AuditEntry};
use crate::core::traits::audit::AuditLogger;

/// What an audit entry is about. Everything but the action is optional.
#[derive(Debug, Default)]
pub struct AuditContext<'a> {
    pub repository: Option<&'a str>,
    pub environment: Option<&'a str>,
    pub detail: Option<String>,
    pub state_hash: Option<String>,
}

/// Read the git user name and email from the local/global config.
/// Returns `("unknown", None)` if git is not available.
pub fn git_author() -> (String, Option<String>) {
    let name = git_config("user.name").unwrap_or_else(|| "unknown".to_string());
    let email = git_config("user.email");
    (name, email)
}

fn git_config(key: &str) -> Option<String> {
    Command::new("git")
        .args(["config", key])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Record an audit event. Warns on failure instead of propagating
/// the error, since audit should not block the main operation.
pub fn log_audit(settings: &Settings, action: AuditAction, context: AuditContext<'_>) {
    let Some(log_path) = settings.audit_log.as_deref() else {
        return;
    };

    let logger = JsonAuditLogger::new(log_path);
    let (author, email) = git_author();

    let entry = AuditEntry {
        timestamp: Utc::now(),
        author,
        email,
        action,
        repository: context.repository.map(str::to_string),
        environment: context.environment.map(str::to_string),
        detail: context.detail,
        state_hash: context.state_hash,
    };

    if let Err(e) = logger.log_event(&entry) {
        output::warning(&format!("Could not write audit log: {e}"));
    }
}
