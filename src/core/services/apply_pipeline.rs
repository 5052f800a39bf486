use std::fmt;
use std::time::Duration;

use crate::core::errors::{EnvsyncError, Result};
use crate::core::models::document::ValueMap;
use crate::core::models::payload::ResolvedPayload;
use crate::core::models::public_key::{PublicKey, SealedSecret};
use crate::core::traits::remote::{RemoteError, RemoteService};
use crate::core::traits::sealer::SecretSealer;

/// Pause after every upload to stay under the hosting API's rate limit.
pub const INTER_CALL_DELAY: Duration = Duration::from_secs(1);

/// The four upload groups, in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadGroup {
    EnvironmentSecrets,
    RepositorySecrets,
    EnvironmentVariables,
    RepositoryVariables,
}

/// Where an upload lands: the deployment environment or the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Environment,
    Repository,
}

impl UploadGroup {
    pub fn secrets(scope: Scope) -> Self {
        match scope {
            Scope::Environment => UploadGroup::EnvironmentSecrets,
            Scope::Repository => UploadGroup::RepositorySecrets,
        }
    }

    pub fn variables(scope: Scope) -> Self {
        match scope {
            Scope::Environment => UploadGroup::EnvironmentVariables,
            Scope::Repository => UploadGroup::RepositoryVariables,
        }
    }
}

impl fmt::Display for UploadGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadGroup::EnvironmentSecrets => write!(f, "Environment secrets"),
            UploadGroup::RepositorySecrets => write!(f, "Repository secrets"),
            UploadGroup::EnvironmentVariables => write!(f, "Environment variables"),
            UploadGroup::RepositoryVariables => write!(f, "Repository variables"),
        }
    }
}

/// Progress notifications emitted while a payload is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyEvent {
    EnvironmentReady { environment: String },
    KeysFetched,
    Uploading { group: UploadGroup, name: String },
    GroupApplied { group: UploadGroup, count: usize },
}

/// Number of entries uploaded per group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub environment_secrets: usize,
    pub repository_secrets: usize,
    pub environment_variables: usize,
    pub repository_variables: usize,
}

impl ApplyReport {
    pub fn total(&self) -> usize {
        self.environment_secrets
            + self.repository_secrets
            + self.environment_variables
            + self.repository_variables
    }
}

/// Pushes a resolved payload to the hosting service.
///
/// The sequence is fixed: upsert the environment, fetch both public keys,
/// then upload environment secrets, repository secrets, environment
/// variables and repository variables. Each call completes before the next
/// one starts and the first failure ends the run. Nothing is retried and
/// nothing already applied is rolled back.
pub struct ApplyPipeline<'a> {
    remote: &'a dyn RemoteService,
    sealer: &'a dyn SecretSealer,
}

impl<'a> ApplyPipeline<'a> {
    pub fn new(remote: &'a dyn RemoteService, sealer: &'a dyn SecretSealer) -> Self {
        Self { remote, sealer }
    }

    /// Apply `payload`, reporting progress through `on_event`.
    pub async fn run<F>(&self, payload: &ResolvedPayload, mut on_event: F) -> Result<ApplyReport>
    where
        F: FnMut(ApplyEvent),
    {
        let repo = payload.repository.as_str();
        let env = payload.environment.as_str();
        let scope = format!("{repo} [{env}]");

        self.remote
            .upsert_environment(repo, env)
            .await
            .map_err(remote_failure("Creating environment", &scope))?;
        on_event(ApplyEvent::EnvironmentReady {
            environment: env.to_string(),
        });

        let environment_key = self
            .remote
            .environment_public_key(repo, env)
            .await
            .map_err(remote_failure("Fetching environment public key", &scope))?;
        let repository_key = self
            .remote
            .repository_public_key(repo)
            .await
            .map_err(remote_failure("Fetching repository public key", repo))?;
        on_event(ApplyEvent::KeysFetched);

        let mut report = ApplyReport::default();

        report.environment_secrets = self
            .upload_secrets(
                payload,
                Scope::Environment,
                &payload.secrets.environment,
                &environment_key,
                &mut on_event,
            )
            .await?;

        report.repository_secrets = self
            .upload_secrets(
                payload,
                Scope::Repository,
                &payload.secrets.repository,
                &repository_key,
                &mut on_event,
            )
            .await?;

        report.environment_variables = self
            .upload_variables(
                payload,
                Scope::Environment,
                &payload.variables.environment,
                &mut on_event,
            )
            .await?;

        report.repository_variables = self
            .upload_variables(
                payload,
                Scope::Repository,
                &payload.variables.repository,
                &mut on_event,
            )
            .await?;

        Ok(report)
    }

    async fn upload_secrets<F>(
        &self,
        payload: &ResolvedPayload,
        scope: Scope,
        secrets: &ValueMap,
        key: &PublicKey,
        on_event: &mut F,
    ) -> Result<usize>
    where
        F: FnMut(ApplyEvent),
    {
        let group = UploadGroup::secrets(scope);
        let repo = payload.repository.as_str();
        let env = payload.environment.as_str();

        for (name, value) in secrets {
            on_event(ApplyEvent::Uploading {
                group,
                name: name.clone(),
            });

            let secret = SealedSecret {
                name: name.clone(),
                encrypted_value: self.sealer.seal(value, key)?,
                key_id: key.key_id.clone(),
            };

            let result = match scope {
                Scope::Environment => self.remote.put_environment_secret(repo, env, &secret).await,
                Scope::Repository => self.remote.put_repository_secret(repo, &secret).await,
            };
            result.map_err(remote_failure(
                &format!("Uploading {}", group.to_string().to_lowercase()),
                &format!("{name} on {repo} [{env}]"),
            ))?;

            tokio::time::sleep(INTER_CALL_DELAY).await;
        }

        on_event(ApplyEvent::GroupApplied {
            group,
            count: secrets.len(),
        });
        Ok(secrets.len())
    }

    async fn upload_variables<F>(
        &self,
        payload: &ResolvedPayload,
        scope: Scope,
        variables: &ValueMap,
        on_event: &mut F,
    ) -> Result<usize>
    where
        F: FnMut(ApplyEvent),
    {
        let group = UploadGroup::variables(scope);
        let repo = payload.repository.as_str();
        let env = payload.environment.as_str();

        for (name, value) in variables {
            on_event(ApplyEvent::Uploading {
                group,
                name: name.clone(),
            });

            let result = match scope {
                Scope::Environment => {
                    self.remote
                        .create_environment_variable(repo, env, name, value)
                        .await
                }
                Scope::Repository => {
                    self.remote
                        .create_repository_variable(repo, name, value)
                        .await
                }
            };
            result.map_err(remote_failure(
                &format!("Uploading {}", group.to_string().to_lowercase()),
                &format!("{name} on {repo} [{env}]"),
            ))?;

            tokio::time::sleep(INTER_CALL_DELAY).await;
        }

        on_event(ApplyEvent::GroupApplied {
            group,
            count: variables.len(),
        });
        Ok(variables.len())
    }
}

/// Wrap a remote failure with the step and identifier it happened on.
fn remote_failure(step: &str, target: &str) -> impl FnOnce(RemoteError) -> EnvsyncError {
    let step = step.to_string();
    let target = target.to_string();
    move |source| EnvsyncError::Remote {
        step,
        target,
        source,
    }
}
