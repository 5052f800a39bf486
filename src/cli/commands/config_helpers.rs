use crate::cli::output;
use crate::config::settings::Settings;
use crate::core::errors::Result;
use crate::core::services::versioner::ContentVersioner;

/// Load the configuration document named by `--config`.
pub fn load_config(settings: &Settings) -> Result<ContentVersioner> {
    let versioner = ContentVersioner::load(&settings.config_path)?;
    output::detail(&format!(
        "Config: {} ({} bytes)",
        versioner.source_path().display(),
        versioner.raw().len()
    ));
    output::detail(&format!("Fingerprint: {}", versioner.fingerprint()));
    Ok(versioner)
}
