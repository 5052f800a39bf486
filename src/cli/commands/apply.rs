use colored::Colorize;

use crate::adapters::cipher::sealed_box::SealedBoxSealer;
use crate::adapters::github::github_client::GitHubClient;
use crate::adapters::prompt::console_prompter::ConsolePrompter;
use crate::cli::output;
use crate::config::settings::Settings;
use crate::core::errors::{EnvsyncError, Result};
use crate::core::models::audit_entry::AuditAction;
use crate::core::services::apply_pipeline::{ApplyEvent, ApplyPipeline};
use crate::core::services::merge::build_payload;
use crate::core::services::resolver::ConfigResolver;
use crate::core::services::selection;
use crate::core::traits::prompt::Prompter;

use super::audit_helpers::{AuditContext, log_audit};
use super::config_helpers::load_config;
use super::plan::print_payload;

/// Execute the `envsync apply` command.
///
/// Snapshots the configuration, asks for a repository and an environment
/// (unless given on the command line), previews the key names, asks for
/// confirmation and pushes everything to GitHub.
pub fn execute(
    settings: &Settings,
    repository: Option<&str>,
    environment: Option<&str>,
    assume_yes: bool,
) -> Result<()> {
    let credentials = settings.credentials()?;
    let versioner = load_config(settings)?;

    let record = versioner.snapshot(&settings.versions_dir)?;
    output::success(&format!("Snapshot {}", &record.hash[..12]));
    output::detail(&format!("Stored at {}", record.path.display()));
    log_audit(
        settings,
        AuditAction::Snapshot,
        AuditContext {
            detail: Some(record.path.display().to_string()),
            state_hash: Some(record.hash.clone()),
            ..Default::default()
        },
    );

    let resolver = ConfigResolver::new(versioner.document());
    let mut prompter = ConsolePrompter;
    let (repository, environment) =
        select_target(&resolver, &mut prompter, repository, environment)?;

    let payload = build_payload(&resolver, &repository, &environment)?;

    output::header(&format!("envsync apply: {repository} [{environment}]"));
    print_payload(&payload);

    if !assume_yes {
        let question = format!(
            "  Push {} value(s) to {repository} [{environment}]? Type 'yes' to continue: ",
            payload.upload_count()
        );
        if !selection::confirm(&mut prompter, &question)? {
            output::warning("Aborted, nothing was applied");
            return Ok(());
        }
    }

    let client = GitHubClient::new(&credentials, &settings.api_url)?;
    let pipeline = ApplyPipeline::new(&client, &SealedBoxSealer);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let sp = output::spinner(&format!("Applying to {repository} [{environment}]..."));
    let result = rt.block_on(pipeline.run(&payload, |event| match event {
        ApplyEvent::EnvironmentReady { environment } => {
            sp.suspend(|| output::success(&format!("Environment {environment} ready")));
        }
        ApplyEvent::KeysFetched => {
            sp.suspend(|| output::detail("Public keys fetched"));
        }
        ApplyEvent::Uploading { group, name } => {
            sp.set_message(format!("{group}: {name}"));
        }
        ApplyEvent::GroupApplied { group, count } => {
            sp.suspend(|| output::success(&format!("{group}: {count} uploaded")));
        }
    }));
    match &result {
        Ok(report) => output::finish_spinner(
            sp,
            &format!(
                "Applied {} value(s) to {}",
                report.total(),
                format!("{repository} [{environment}]").cyan()
            ),
        ),
        Err(_) => sp.finish_and_clear(),
    }

    let detail = match &result {
        Ok(report) => format!("{} value(s) applied", report.total()),
        Err(e) => format!("failed: {}", e.to_string().lines().next().unwrap_or_default()),
    };
    log_audit(
        settings,
        AuditAction::Apply,
        AuditContext {
            repository: Some(&repository),
            environment: Some(&environment),
            detail: Some(detail),
            state_hash: Some(record.hash.clone()),
        },
    );

    result?;
    Ok(())
}

/// Pick the repository and environment, prompting for whichever was not
/// given. Given names must exist in the document.
pub fn select_target(
    resolver: &ConfigResolver<'_>,
    prompter: &mut dyn Prompter,
    repository: Option<&str>,
    environment: Option<&str>,
) -> Result<(String, String)> {
    let repository = match repository {
        Some(name) => {
            resolver.repository(name)?;
            name.to_string()
        }
        None => {
            let names = resolver.repositories()?;
            choose_from(prompter, "Repositories", "Select repository", &names)?
        }
    };

    let environment = match environment {
        Some(name) => {
            resolver.repository_environment(&repository, name)?;
            name.to_string()
        }
        None => {
            let names = resolver.environment_names(&repository)?;
            choose_from(prompter, "Environments", "Select environment", &names)?
        }
    };

    Ok((repository, environment))
}

fn choose_from(
    prompter: &mut dyn Prompter,
    title: &str,
    question: &str,
    names: &[String],
) -> Result<String> {
    if names.is_empty() {
        return Err(EnvsyncError::InvalidSelection {
            input: String::new(),
            max: 0,
        });
    }

    if !output::is_quiet() {
        println!("\n  {}", title.bold());
        for (i, name) in names.iter().enumerate() {
            println!("    {}. {name}", i + 1);
        }
    }

    let chosen = selection::choose(prompter, &format!("  {question} [1-{}]: ", names.len()), names)?;
    Ok(chosen.to_string())
}
