use std::path::PathBuf;

use crate::cli::Cli;
use crate::core::errors::{EnvsyncError, Result};

/// Environment variable holding the account that owns the repositories.
pub const OWNER_ENV: &str = "GITHUB_OWNER";
/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Runtime settings, read once from flags and the environment.
#[derive(Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    pub versions_dir: PathBuf,
    /// `None` when auditing is disabled.
    pub audit_log: Option<PathBuf>,
    pub api_url: String,
    pub owner: Option<String>,
    pub token: Option<String>,
    pub verbose: bool,
    pub quiet: bool,
}

/// Owner and token for the hosting service.
#[derive(Clone)]
pub struct Credentials {
    pub owner: String,
    pub token: String,
}

// Custom Debug impls keep the token out of logs and panics
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("config_path", &self.config_path)
            .field("versions_dir", &self.versions_dir)
            .field("audit_log", &self.audit_log)
            .field("api_url", &self.api_url)
            .field("owner", &self.owner)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("verbose", &self.verbose)
            .field("quiet", &self.quiet)
            .finish()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("owner", &self.owner)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            config_path: cli.config.clone(),
            versions_dir: cli.versions_dir.clone(),
            audit_log: (!cli.no_audit).then(|| cli.audit_log.clone()),
            api_url: cli.api_url.clone(),
            owner: non_blank(cli.owner.as_deref()),
            token: non_blank(cli.token.as_deref()),
            verbose: cli.verbose,
            quiet: cli.quiet,
        }
    }

    /// Owner and token, or `MissingCredential` for the first one absent.
    pub fn credentials(&self) -> Result<Credentials> {
        let owner = self.owner.clone().ok_or_else(|| EnvsyncError::MissingCredential {
            name: "repository owner".into(),
            env_var: OWNER_ENV.into(),
        })?;
        let token = self.token.clone().ok_or_else(|| EnvsyncError::MissingCredential {
            name: "API token".into(),
            env_var: TOKEN_ENV.into(),
        })?;
        Ok(Credentials { owner, token })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Settings {
        let mut argv = vec!["envsync"];
        argv.extend_from_slice(args);
        Settings::from_cli(&Cli::parse_from(argv))
    }

    #[test]
    fn defaults_apply_without_flags() {
        let settings = parse(&["check"]);

        assert_eq!(settings.config_path, PathBuf::from("config.json"));
        assert_eq!(settings.versions_dir, PathBuf::from("versions"));
        assert_eq!(settings.audit_log, Some(PathBuf::from(".envsync/audit.log")));
    }

    #[test]
    fn no_audit_disables_log() {
        let settings = parse(&["--no-audit", "check"]);
        assert!(settings.audit_log.is_none());
    }

    #[test]
    fn credentials_require_owner_first() {
        let settings = Settings {
            owner: None,
            token: None,
            ..parse(&["check"])
        };

        match settings.credentials() {
            Err(EnvsyncError::MissingCredential { env_var, .. }) => assert_eq!(env_var, OWNER_ENV),
            other => panic!("expected MissingCredential, got {other:?}"),
        }
    }

    #[test]
    fn credentials_require_token() {
        let settings = Settings {
            owner: Some("acme".into()),
            token: None,
            ..parse(&["check"])
        };

        match settings.credentials() {
            Err(EnvsyncError::MissingCredential { env_var, .. }) => assert_eq!(env_var, TOKEN_ENV),
            other => panic!("expected MissingCredential, got {other:?}"),
        }
    }

    #[test]
    fn blank_values_count_as_missing() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" acme ")), Some("acme".into()));
    }

    #[test]
    fn debug_redacts_token() {
        let settings = Settings {
            owner: Some("acme".into()),
            token: Some("ghp_secret".into()),
            ..parse(&["check"])
        };

        let creds = settings.credentials().unwrap();
        assert!(!format!("{settings:?}").contains("ghp_secret"));
        assert!(!format!("{creds:?}").contains("ghp_secret"));
    }
}
