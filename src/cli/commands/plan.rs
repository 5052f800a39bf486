use colored::Colorize;

use crate::cli::output;
use crate::config::settings::Settings;
use crate::core::errors::Result;
use crate::core::models::audit_entry::AuditAction;
use crate::core::models::document::ValueMap;
use crate::core::models::payload::ResolvedPayload;
use crate::core::services::apply_pipeline::UploadGroup;
use crate::core::services::merge::build_payload;
use crate::core::services::resolver::ConfigResolver;

use super::audit_helpers::{AuditContext, log_audit};
use super::config_helpers::load_config;

/// Execute the `envsync plan` command.
///
/// Resolves the payload for one repository/environment pair and prints
/// the key names per upload group. Values are never shown and GitHub is
/// never contacted.
pub fn execute(settings: &Settings, repository: &str, environment: &str) -> Result<()> {
    let versioner = load_config(settings)?;
    let resolver = ConfigResolver::new(versioner.document());
    let payload = build_payload(&resolver, repository, environment)?;

    output::header(&format!("envsync plan: {repository} [{environment}]"));
    print_payload(&payload);
    output::success(&format!("{} upload(s) planned", payload.upload_count()));

    log_audit(
        settings,
        AuditAction::Plan,
        AuditContext {
            repository: Some(repository),
            environment: Some(environment),
            detail: Some(format!("{} upload(s) planned", payload.upload_count())),
            state_hash: Some(versioner.fingerprint()),
        },
    );

    Ok(())
}

/// Print the key names of every upload group in apply order.
pub fn print_payload(payload: &ResolvedPayload) {
    if output::is_quiet() {
        return;
    }
    print_group(UploadGroup::EnvironmentSecrets, &payload.secrets.environment);
    print_group(UploadGroup::RepositorySecrets, &payload.secrets.repository);
    print_group(UploadGroup::EnvironmentVariables, &payload.variables.environment);
    print_group(UploadGroup::RepositoryVariables, &payload.variables.repository);
    println!();
}

fn print_group(group: UploadGroup, values: &ValueMap) {
    println!(
        "\n  {} {}",
        group.to_string().bold(),
        format!("({})", values.len()).dimmed()
    );
    if values.is_empty() {
        println!("    {}", "none".dimmed());
    }
    for name in values.keys() {
        println!("    • {name}");
    }
}
