use indexmap::IndexMap;
use serde::Deserialize;

/// Ordered string map used for secrets, vars and server attributes.
///
/// Keeps document insertion order so listings and uploads follow the
/// order the operator wrote.
pub type ValueMap = IndexMap<String, String>;

/// Root of the JSON configuration file.
///
/// Every member is optional at parse time. A document that parses but
/// lacks a section fails later, when that section is first requested.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigDocument {
    pub servers: Option<ServerCatalog>,
    pub configs: Option<Configs>,
    pub repositories: Option<IndexMap<String, Repository>>,
}

/// Environment name -> server name -> connection attributes.
pub type ServerCatalog = IndexMap<String, IndexMap<String, ValueMap>>;

/// The `configs` member.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Configs {
    pub global: Option<GlobalConfig>,
}

/// Bucket name (`all`, `staging`, `production`) -> values.
pub type GlobalConfig = IndexMap<String, SecretsAndVars>;

/// A pair of secret and variable maps.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SecretsAndVars {
    #[serde(default)]
    pub secrets: ValueMap,
    #[serde(default)]
    pub vars: ValueMap,
}

/// A repository entry under `repositories`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub environments: IndexMap<String, RepositoryEnvironment>,
}

/// Per-environment settings of one repository.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RepositoryEnvironment {
    pub server: Option<String>,
    #[serde(default)]
    pub secrets: ValueMap,
    #[serde(default)]
    pub vars: ValueMap,
}

/// Name of the global bucket merged into every environment.
pub const COMMON_BUCKET: &str = "all";

/// Environment names the hosting side is expected to know.
pub const KNOWN_ENVIRONMENTS: [&str; 2] = ["staging", "production"];

/// Server attributes every catalog entry is expected to carry.
pub const SERVER_ATTRIBUTES: [&str; 3] = ["REMOTE_HOST", "REMOTE_USER", "SSH_KEY"];
