use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::core::models::document::{
    COMMON_BUCKET, ConfigDocument, KNOWN_ENVIRONMENTS, SERVER_ATTRIBUTES, ValueMap,
};
use crate::core::services::resolver::ConfigResolver;

/// Names GitHub accepts for Actions secrets and variables.
const NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";
const RESERVED_PREFIX: &str = "GITHUB_";

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(NAME_PATTERN).expect("name pattern is a valid regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// One finding, located by its key path in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckIssue {
    pub severity: Severity,
    pub location: String,
    pub message: String,
}

impl fmt::Display for CheckIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Result of checking a whole configuration document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckReport {
    pub issues: Vec<CheckIssue>,
    /// Repository/environment pairs that were examined.
    pub targets: usize,
}

impl CheckReport {
    /// True when nothing would make an apply fail.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    fn error(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Error, location.into(), message.into());
    }

    fn warning(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, location.into(), message.into());
    }

    fn push(&mut self, severity: Severity, location: String, message: String) {
        self.issues.push(CheckIssue {
            severity,
            location,
            message,
        });
    }
}

/// Static consistency checks over a configuration document.
///
/// Walks every repository/environment pair the way an apply would and
/// reports every problem at once instead of stopping at the first
/// missing key.
pub struct CheckService;

impl CheckService {
    pub fn check(&self, document: &ConfigDocument) -> CheckReport {
        let resolver = ConfigResolver::new(document);
        let mut report = CheckReport::default();

        self.check_globals(&resolver, &mut report);
        self.check_servers(&resolver, &mut report);

        let repositories = match resolver.repositories() {
            Ok(names) => names,
            Err(e) => {
                report.error("repositories", headline(&e));
                return report;
            }
        };

        let mut seen_environments: Vec<String> = Vec::new();
        for repository in &repositories {
            let environments = resolver.environment_names(repository).unwrap_or_default();
            if environments.is_empty() {
                report.warning(
                    format!("repositories.{repository}"),
                    "declares no environments",
                );
            }
            for environment in &environments {
                report.targets += 1;
                self.check_target(&resolver, repository, environment, &mut report);
                if !seen_environments.contains(environment) {
                    seen_environments.push(environment.clone());
                }
            }
        }

        // Buckets are shared by every repository of an environment
        for environment in &seen_environments {
            self.check_global_bucket(&resolver, environment, &mut report);
        }

        report
    }

    fn check_globals(&self, resolver: &ConfigResolver<'_>, report: &mut CheckReport) {
        match resolver.global_common_secrets() {
            Ok(secrets) => {
                check_names(report, &format!("configs.global.{COMMON_BUCKET}.secrets"), secrets);
                if let Ok(vars) = resolver.global_common_vars() {
                    check_names(report, &format!("configs.global.{COMMON_BUCKET}.vars"), vars);
                }
            }
            Err(e) => report.error(format!("configs.global.{COMMON_BUCKET}"), headline(&e)),
        }
    }

    fn check_servers(&self, resolver: &ConfigResolver<'_>, report: &mut CheckReport) {
        let Ok(catalog) = resolver.servers() else {
            // Reported per target when a server is actually referenced
            return;
        };
        for (environment, servers) in catalog {
            for (server, attributes) in servers {
                let location = format!("servers.{environment}.{server}");
                for attribute in SERVER_ATTRIBUTES {
                    if resolver
                        .server_config_value(environment, server, attribute)
                        .is_err()
                    {
                        report.warning(&location, format!("missing attribute {attribute}"));
                    }
                }
                for key in attributes.keys() {
                    if let Some(problem) = name_problem(&format!("{key}_{server}")) {
                        report.error(format!("{location}.{key}"), problem);
                    }
                }
            }
        }
    }

    fn check_target(
        &self,
        resolver: &ConfigResolver<'_>,
        repository: &str,
        environment: &str,
        report: &mut CheckReport,
    ) {
        let location = format!("repositories.{repository}.environments.{environment}");

        if !KNOWN_ENVIRONMENTS.contains(&environment) {
            report.warning(
                &location,
                format!(
                    "environment '{environment}' is not one of {}",
                    KNOWN_ENVIRONMENTS.join(", ")
                ),
            );
        }

        if let Ok(secrets) = resolver.repository_secrets(repository, environment) {
            check_names(report, &format!("{location}.secrets"), secrets);
        }
        if let Ok(vars) = resolver.repository_vars(repository, environment) {
            check_names(report, &format!("{location}.vars"), vars);
        }

        match resolver.repository_server_name(repository, environment) {
            Ok(server) => {
                if let Err(e) = resolver.server_configs(environment, server) {
                    let mut message = format!("server '{server}': {}", headline(&e));
                    if let Ok(names) = resolver.server_names(environment)
                        && !names.is_empty()
                    {
                        message.push_str(&format!(" (defined: {})", names.join(", ")));
                    }
                    report.error(&location, message);
                }
            }
            Err(e) => report.error(&location, headline(&e)),
        }
    }

    fn check_global_bucket(
        &self,
        resolver: &ConfigResolver<'_>,
        environment: &str,
        report: &mut CheckReport,
    ) {
        let location = format!("configs.global.{environment}");
        match resolver.global_values(environment) {
            Ok(bucket) => {
                check_names(report, &format!("{location}.secrets"), &bucket.secrets);
                check_names(report, &format!("{location}.vars"), &bucket.vars);
            }
            Err(e) => report.error(location, headline(&e)),
        }
    }
}

fn check_names(report: &mut CheckReport, location: &str, values: &ValueMap) {
    for key in values.keys() {
        if let Some(problem) = name_problem(key) {
            report.error(format!("{location}.{key}"), problem);
        }
    }
}

/// Why GitHub would reject `name` as a secret or variable name.
pub fn name_problem(name: &str) -> Option<String> {
    if !name_pattern().is_match(name) {
        return Some(format!(
            "'{name}' is not a valid name (letters, digits and underscores, not starting with a digit)"
        ));
    }
    if name.to_ascii_uppercase().starts_with(RESERVED_PREFIX) {
        return Some(format!("'{name}' uses the reserved {RESERVED_PREFIX} prefix"));
    }
    None
}

/// First line of an error message, without the hint block.
fn headline(error: &crate::core::errors::EnvsyncError) -> String {
    error
        .to_string()
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}
