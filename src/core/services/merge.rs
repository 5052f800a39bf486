use crate::core::errors::Result;
use crate::core::models::document::ValueMap;
use crate::core::models::payload::{ResolvedPayload, ScopedValues};
use crate::core::services::resolver::ConfigResolver;

/// Merge layers from lowest to highest precedence into a fresh map.
///
/// A key from a later layer replaces the value of the same key from an
/// earlier one and keeps the earlier position; new keys are appended.
pub fn merge_layers(layers: &[&ValueMap]) -> ValueMap {
    let mut merged = ValueMap::new();
    for layer in layers {
        for (key, value) in layer.iter() {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Build the payload for one repository/environment pair.
///
/// - environment secrets: repository secrets, then the server's
///   suffixed connection attributes
/// - environment vars: repository vars only
/// - repository secrets/vars: the `all` bucket, then the environment bucket
///
/// Globals never reach the environment layer and servers never reach vars.
pub fn build_payload(
    resolver: &ConfigResolver<'_>,
    repository: &str,
    environment: &str,
) -> Result<ResolvedPayload> {
    let server = resolver.repository_server_name(repository, environment)?;

    let server_configs = resolver.server_configs(environment, server)?;
    let environment_secrets = merge_layers(&[
        resolver.repository_secrets(repository, environment)?,
        &server_configs,
    ]);

    let environment_vars = merge_layers(&[resolver.repository_vars(repository, environment)?]);

    let repository_secrets = merge_layers(&[
        resolver.global_common_secrets()?,
        resolver.global_environment_secrets(environment)?,
    ]);

    let repository_vars = merge_layers(&[
        resolver.global_common_vars()?,
        resolver.global_environment_vars(environment)?,
    ]);

    Ok(ResolvedPayload {
        repository: repository.to_string(),
        environment: environment.to_string(),
        secrets: ScopedValues {
            environment: environment_secrets,
            repository: repository_secrets,
        },
        variables: ScopedValues {
            environment: environment_vars,
            repository: repository_vars,
        },
    })
}
