use colored::Colorize;

use crate::cli::output;
use crate::config::settings::Settings;
use crate::core::errors::Result;
use crate::core::services::versioner::{ContentVersioner, VersionStore};

/// Execute the `envsync versions` command.
///
/// Without `--show`, lists stored snapshots newest first and marks the
/// one matching the current configuration. With `--show HASH`, prints
/// the original text of that snapshot.
pub fn execute(settings: &Settings, show: Option<&str>) -> Result<()> {
    let store = VersionStore;

    if let Some(hash) = show {
        let text = store.read(&settings.versions_dir, hash)?;
        print!("{text}");
        if !text.ends_with('\n') {
            println!();
        }
        return Ok(());
    }

    let versions = store.list(&settings.versions_dir)?;

    // The current config may be missing or broken; listing still works
    let current = ContentVersioner::load(&settings.config_path)
        .ok()
        .map(|v| v.fingerprint());

    if versions.is_empty() {
        output::header("envsync versions");
        output::warning(&format!(
            "No snapshots in {}",
            settings.versions_dir.display()
        ));
        println!("  Run 'envsync apply' to record one.");
        return Ok(());
    }

    output::header(&format!("envsync versions ({} snapshots)", versions.len()));
    println!();

    for version in &versions {
        let date = version
            .modified
            .map(|m| m.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let marker = if current.as_deref() == Some(version.hash.as_str()) {
            "current".green().to_string()
        } else {
            String::new()
        };
        println!(
            "  {} {} {} {}",
            date.dimmed(),
            "│".dimmed(),
            version.hash,
            marker
        );
        output::detail(&format!("  {}", version.path.display()));
    }

    Ok(())
}
