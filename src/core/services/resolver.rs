use indexmap::IndexMap;

use crate::core::errors::{EnvsyncError, Result};
use crate::core::models::document::{
    COMMON_BUCKET, ConfigDocument, GlobalConfig, Repository, RepositoryEnvironment,
    SecretsAndVars, ServerCatalog, ValueMap,
};

/// Read-only projections over a parsed configuration document.
///
/// Every accessor looks its key up on demand and fails with
/// `MissingKey` naming the full key path when it is absent. Nothing is
/// defaulted and nothing is validated ahead of access.
pub struct ConfigResolver<'a> {
    document: &'a ConfigDocument,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(document: &'a ConfigDocument) -> Self {
        Self { document }
    }

    fn all_repositories(&self) -> Result<&'a IndexMap<String, Repository>> {
        self.document
            .repositories
            .as_ref()
            .ok_or_else(|| EnvsyncError::missing(&["repositories"]))
    }

    /// Repository names in document order.
    pub fn repositories(&self) -> Result<Vec<String>> {
        Ok(self.all_repositories()?.keys().cloned().collect())
    }

    pub fn repository(&self, name: &str) -> Result<&'a Repository> {
        self.all_repositories()?
            .get(name)
            .ok_or_else(|| EnvsyncError::missing(&["repositories", name]))
    }

    /// Environment names declared by a repository, in document order.
    pub fn environment_names(&self, name: &str) -> Result<Vec<String>> {
        Ok(self.repository(name)?.environments.keys().cloned().collect())
    }

    pub fn repository_environment(
        &self,
        name: &str,
        environment: &str,
    ) -> Result<&'a RepositoryEnvironment> {
        self.repository(name)?
            .environments
            .get(environment)
            .ok_or_else(|| EnvsyncError::missing(&["repositories", name, "environments", environment]))
    }

    /// The repository environment's own secrets, not merged with anything.
    pub fn repository_secrets(&self, name: &str, environment: &str) -> Result<&'a ValueMap> {
        Ok(&self.repository_environment(name, environment)?.secrets)
    }

    /// The repository environment's own vars, not merged with anything.
    pub fn repository_vars(&self, name: &str, environment: &str) -> Result<&'a ValueMap> {
        Ok(&self.repository_environment(name, environment)?.vars)
    }

    pub fn repository_server_name(&self, name: &str, environment: &str) -> Result<&'a str> {
        self.repository_environment(name, environment)?
            .server
            .as_deref()
            .ok_or_else(|| {
                EnvsyncError::missing(&["repositories", name, "environments", environment, "server"])
            })
    }

    pub fn servers(&self) -> Result<&'a ServerCatalog> {
        self.document
            .servers
            .as_ref()
            .ok_or_else(|| EnvsyncError::missing(&["servers"]))
    }

    fn environment_servers(&self, environment: &str) -> Result<&'a IndexMap<String, ValueMap>> {
        self.servers()?
            .get(environment)
            .ok_or_else(|| EnvsyncError::missing(&["servers", environment]))
    }

    /// Server names declared for an environment, in document order.
    pub fn server_names(&self, environment: &str) -> Result<Vec<String>> {
        Ok(self.environment_servers(environment)?.keys().cloned().collect())
    }

    fn server(&self, environment: &str, server: &str) -> Result<&'a ValueMap> {
        self.environment_servers(environment)?
            .get(server)
            .ok_or_else(|| EnvsyncError::missing(&["servers", environment, server]))
    }

    /// One raw attribute of a server, looked up by its unsuffixed name.
    pub fn server_config_value(
        &self,
        environment: &str,
        server: &str,
        attribute: &str,
    ) -> Result<&'a str> {
        self.server(environment, server)?
            .get(attribute)
            .map(String::as_str)
            .ok_or_else(|| EnvsyncError::missing(&["servers", environment, server, attribute]))
    }

    /// Connection attributes of a server, each key suffixed with
    /// `_<server>` so several servers can share one secrets namespace.
    ///
    /// `REMOTE_HOST` of `web01` becomes `REMOTE_HOST_web01`.
    pub fn server_configs(&self, environment: &str, server: &str) -> Result<ValueMap> {
        Ok(self
            .server(environment, server)?
            .iter()
            .map(|(key, value)| (format!("{key}_{server}"), value.clone()))
            .collect())
    }

    fn global_configs(&self) -> Result<&'a GlobalConfig> {
        self.document
            .configs
            .as_ref()
            .ok_or_else(|| EnvsyncError::missing(&["configs"]))?
            .global
            .as_ref()
            .ok_or_else(|| EnvsyncError::missing(&["configs", "global"]))
    }

    fn global_bucket(&self, bucket: &str) -> Result<&'a SecretsAndVars> {
        self.global_configs()?
            .get(bucket)
            .ok_or_else(|| EnvsyncError::missing(&["configs", "global", bucket]))
    }

    /// The per-environment global bucket, without the `all` bucket.
    pub fn global_values(&self, environment: &str) -> Result<&'a SecretsAndVars> {
        self.global_bucket(environment)
    }

    pub fn global_environment_secrets(&self, environment: &str) -> Result<&'a ValueMap> {
        Ok(&self.global_bucket(environment)?.secrets)
    }

    pub fn global_environment_vars(&self, environment: &str) -> Result<&'a ValueMap> {
        Ok(&self.global_bucket(environment)?.vars)
    }

    pub fn global_common_secrets(&self) -> Result<&'a ValueMap> {
        Ok(&self.global_bucket(COMMON_BUCKET)?.secrets)
    }

    pub fn global_common_vars(&self) -> Result<&'a ValueMap> {
        Ok(&self.global_bucket(COMMON_BUCKET)?.vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> ConfigDocument {
        serde_json::from_str(
            r#"{
                "servers": {
                    "staging": {
                        "web01": { "REMOTE_HOST": "10.0.0.1", "REMOTE_USER": "deploy", "SSH_KEY": "stg-key" }
                    },
                    "production": {
                        "web02": { "REMOTE_HOST": "10.1.0.1", "REMOTE_USER": "deploy", "SSH_KEY": "prd-key" }
                    }
                },
                "configs": {
                    "global": {
                        "all": { "secrets": { "SENTRY_DSN": "dsn" }, "vars": { "REGION": "eu-west-1" } },
                        "staging": { "secrets": { "API_URL": "stg" }, "vars": { "LOG_LEVEL": "debug" } },
                        "production": { "secrets": { "API_URL": "prd" }, "vars": { "LOG_LEVEL": "warn" } }
                    }
                },
                "repositories": {
                    "api": {
                        "environments": {
                            "staging": { "server": "web01", "secrets": { "DB_PASS": "s3" }, "vars": { "PORT": "8080" } },
                            "production": { "server": "db1", "secrets": {}, "vars": {} }
                        }
                    },
                    "frontend": { "environments": { "production": { "server": "web02" } } }
                }
            }"#,
        )
        .unwrap()
    }

    fn missing_path(result: Result<impl std::fmt::Debug>) -> String {
        match result {
            Err(EnvsyncError::MissingKey { path }) => path,
            other => panic!("expected MissingKey, got {other:?}"),
        }
    }

    #[test]
    fn repositories_in_document_order() {
        let doc = document();
        let resolver = ConfigResolver::new(&doc);
        assert_eq!(resolver.repositories().unwrap(), vec!["api", "frontend"]);
    }

    #[test]
    fn environment_names_in_document_order() {
        let doc = document();
        let resolver = ConfigResolver::new(&doc);
        assert_eq!(
            resolver.environment_names("api").unwrap(),
            vec!["staging", "production"]
        );
    }

    #[test]
    fn unknown_repository_names_the_path() {
        let doc = document();
        let resolver = ConfigResolver::new(&doc);
        assert_eq!(missing_path(resolver.repository("nope")), "repositories.nope");
    }

    #[test]
    fn unknown_environment_names_the_path() {
        let doc = document();
        let resolver = ConfigResolver::new(&doc);
        assert_eq!(
            missing_path(resolver.repository_environment("frontend", "staging")),
            "repositories.frontend.environments.staging"
        );
    }

    #[test]
    fn repository_values_are_raw() {
        let doc = document();
        let resolver = ConfigResolver::new(&doc);
        let secrets = resolver.repository_secrets("api", "staging").unwrap();
        assert_eq!(secrets.len(), 1);
        assert_eq!(secrets["DB_PASS"], "s3");
        assert_eq!(resolver.repository_vars("api", "staging").unwrap()["PORT"], "8080");
    }

    #[test]
    fn absent_secrets_and_vars_are_empty() {
        let doc = document();
        let resolver = ConfigResolver::new(&doc);
        assert!(resolver.repository_secrets("frontend", "production").unwrap().is_empty());
        assert!(resolver.repository_vars("frontend", "production").unwrap().is_empty());
    }

    #[test]
    fn server_configs_are_suffixed() {
        let doc = document();
        let resolver = ConfigResolver::new(&doc);

        let configs = resolver.server_configs("staging", "web01").unwrap();

        let keys: Vec<&String> = configs.keys().collect();
        assert_eq!(keys, vec!["REMOTE_HOST_web01", "REMOTE_USER_web01", "SSH_KEY_web01"]);
        assert_eq!(configs["SSH_KEY_web01"], "stg-key");
    }

    #[test]
    fn server_names_are_the_environment_servers() {
        let doc = document();
        let resolver = ConfigResolver::new(&doc);

        assert_eq!(resolver.server_names("staging").unwrap(), vec!["web01"]);
        assert_eq!(resolver.server_names("production").unwrap(), vec!["web02"]);
        assert_eq!(missing_path(resolver.server_names("qa")), "servers.qa");
    }

    #[test]
    fn server_config_value_uses_the_raw_attribute_name() {
        let doc = document();
        let resolver = ConfigResolver::new(&doc);

        assert_eq!(
            resolver.server_config_value("staging", "web01", "REMOTE_HOST").unwrap(),
            "10.0.0.1"
        );
        assert_eq!(
            missing_path(resolver.server_config_value("staging", "web01", "REMOTE_HOST_web01")),
            "servers.staging.web01.REMOTE_HOST_web01"
        );
        assert_eq!(
            missing_path(resolver.server_config_value("production", "db1", "REMOTE_HOST")),
            "servers.production.db1"
        );
    }

    #[test]
    fn dangling_server_fails_only_on_server_configs() {
        let doc = document();
        let resolver = ConfigResolver::new(&doc);

        let server = resolver.repository_server_name("api", "production").unwrap();
        assert_eq!(server, "db1");

        assert_eq!(
            missing_path(resolver.server_configs("production", server)),
            "servers.production.db1"
        );
    }

    #[test]
    fn global_buckets_are_separate() {
        let doc = document();
        let resolver = ConfigResolver::new(&doc);

        assert_eq!(resolver.global_common_secrets().unwrap()["SENTRY_DSN"], "dsn");
        assert_eq!(resolver.global_common_vars().unwrap()["REGION"], "eu-west-1");

        let env_secrets = resolver.global_environment_secrets("staging").unwrap();
        assert_eq!(env_secrets.len(), 1);
        assert_eq!(env_secrets["API_URL"], "stg");
        assert_eq!(resolver.global_environment_vars("production").unwrap()["LOG_LEVEL"], "warn");
        assert_eq!(resolver.global_values("staging").unwrap().vars["LOG_LEVEL"], "debug");
    }

    #[test]
    fn missing_sections_fail_on_access() {
        let doc = ConfigDocument::default();
        let resolver = ConfigResolver::new(&doc);

        assert_eq!(missing_path(resolver.repositories()), "repositories");
        assert_eq!(missing_path(resolver.servers()), "servers");
        assert_eq!(missing_path(resolver.global_common_secrets()), "configs");
    }

    #[test]
    fn missing_global_bucket_names_the_path() {
        let doc: ConfigDocument =
            serde_json::from_str(r#"{ "configs": { "global": { "all": {} } } }"#).unwrap();
        let resolver = ConfigResolver::new(&doc);

        assert!(resolver.global_common_vars().unwrap().is_empty());
        assert_eq!(
            missing_path(resolver.global_environment_secrets("production")),
            "configs.global.production"
        );
    }

    #[test]
    fn missing_server_field_names_the_path() {
        let doc: ConfigDocument = serde_json::from_str(
            r#"{ "repositories": { "api": { "environments": { "staging": {} } } } }"#,
        )
        .unwrap();
        let resolver = ConfigResolver::new(&doc);

        assert_eq!(
            missing_path(resolver.repository_server_name("api", "staging")),
            "repositories.api.environments.staging.server"
        );
    }
}
