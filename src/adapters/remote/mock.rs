//! Recording in-memory `RemoteService` for deterministic tests.
//!
//! Every call is stored with the (tokio) instant it was made, including
//! calls configured to fail. Public keys are real X25519 keys so tests
//! can open what the pipeline sealed.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use crypto_box::SecretKey;
use crypto_box::aead::OsRng;
use tokio::time::Instant;

use crate::core::models::public_key::{PublicKey, SealedSecret};
use crate::core::traits::remote::{RemoteError, RemoteService};

/// Operation kinds, used to configure failures and compare traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    UpsertEnvironment,
    EnvironmentPublicKey,
    RepositoryPublicKey,
    EnvironmentSecret,
    RepositorySecret,
    EnvironmentVariable,
    RepositoryVariable,
}

impl CallKind {
    pub fn is_upload(&self) -> bool {
        matches!(
            self,
            CallKind::EnvironmentSecret
                | CallKind::RepositorySecret
                | CallKind::EnvironmentVariable
                | CallKind::RepositoryVariable
        )
    }
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    UpsertEnvironment {
        repo: String,
        environment: String,
    },
    EnvironmentPublicKey {
        repo: String,
        environment: String,
    },
    RepositoryPublicKey {
        repo: String,
    },
    EnvironmentSecret {
        repo: String,
        environment: String,
        name: String,
        encrypted_value: String,
        key_id: String,
    },
    RepositorySecret {
        repo: String,
        name: String,
        encrypted_value: String,
        key_id: String,
    },
    EnvironmentVariable {
        repo: String,
        environment: String,
        name: String,
        value: String,
    },
    RepositoryVariable {
        repo: String,
        name: String,
        value: String,
    },
}

impl RemoteCall {
    pub fn kind(&self) -> CallKind {
        match self {
            RemoteCall::UpsertEnvironment { .. } => CallKind::UpsertEnvironment,
            RemoteCall::EnvironmentPublicKey { .. } => CallKind::EnvironmentPublicKey,
            RemoteCall::RepositoryPublicKey { .. } => CallKind::RepositoryPublicKey,
            RemoteCall::EnvironmentSecret { .. } => CallKind::EnvironmentSecret,
            RemoteCall::RepositorySecret { .. } => CallKind::RepositorySecret,
            RemoteCall::EnvironmentVariable { .. } => CallKind::EnvironmentVariable,
            RemoteCall::RepositoryVariable { .. } => CallKind::RepositoryVariable,
        }
    }
}

struct MockRemoteInner {
    calls: Vec<(Instant, RemoteCall)>,
    /// Fail the nth (1-based) call of a kind with the given error.
    fail_on: Option<(CallKind, usize, RemoteError)>,
    environment_key: SecretKey,
    repository_key: SecretKey,
}

/// Mock hosting service. Clones share state.
#[derive(Clone)]
pub struct MockRemote {
    inner: Arc<Mutex<MockRemoteInner>>,
}

impl MockRemote {
    pub const ENVIRONMENT_KEY_ID: &'static str = "env-key-1";
    pub const REPOSITORY_KEY_ID: &'static str = "repo-key-1";

    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockRemoteInner {
                calls: Vec::new(),
                fail_on: None,
                environment_key: SecretKey::generate(&mut OsRng),
                repository_key: SecretKey::generate(&mut OsRng),
            })),
        }
    }

    /// Make the `nth` call (1-based) of `kind` fail with `error`.
    pub fn fail_at(&self, kind: CallKind, nth: usize, error: RemoteError) {
        self.inner.lock().unwrap().fail_on = Some((kind, nth, error));
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.timed_calls().into_iter().map(|(_, c)| c).collect()
    }

    pub fn timed_calls(&self) -> Vec<(Instant, RemoteCall)> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn open_environment_secret(&self, encrypted_value: &str) -> String {
        let inner = self.inner.lock().unwrap();
        open(&inner.environment_key, encrypted_value)
    }

    pub fn open_repository_secret(&self, encrypted_value: &str) -> String {
        let inner = self.inner.lock().unwrap();
        open(&inner.repository_key, encrypted_value)
    }

    fn record(&self, call: RemoteCall) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock().unwrap();
        let kind = call.kind();
        inner.calls.push((Instant::now(), call));
        let seen = inner.calls.iter().filter(|(_, c)| c.kind() == kind).count();
        match &inner.fail_on {
            Some((fail_kind, nth, error)) if *fail_kind == kind && *nth == seen => {
                Err(error.clone())
            }
            _ => Ok(()),
        }
    }

    fn public_key(&self, key_id: &str, environment: bool) -> PublicKey {
        let inner = self.inner.lock().unwrap();
        let secret = if environment {
            &inner.environment_key
        } else {
            &inner.repository_key
        };
        PublicKey {
            key_id: key_id.to_string(),
            key: STANDARD.encode(secret.public_key().as_bytes()),
        }
    }
}

fn open(key: &SecretKey, encrypted_value: &str) -> String {
    let sealed = STANDARD.decode(encrypted_value).unwrap();
    String::from_utf8(key.unseal(&sealed).unwrap()).unwrap()
}

#[async_trait]
impl RemoteService for MockRemote {
    async fn upsert_environment(&self, repo: &str, environment: &str) -> Result<(), RemoteError> {
        self.record(RemoteCall::UpsertEnvironment {
            repo: repo.into(),
            environment: environment.into(),
        })
    }

    async fn environment_public_key(
        &self,
        repo: &str,
        environment: &str,
    ) -> Result<PublicKey, RemoteError> {
        self.record(RemoteCall::EnvironmentPublicKey {
            repo: repo.into(),
            environment: environment.into(),
        })?;
        Ok(self.public_key(Self::ENVIRONMENT_KEY_ID, true))
    }

    async fn repository_public_key(&self, repo: &str) -> Result<PublicKey, RemoteError> {
        self.record(RemoteCall::RepositoryPublicKey { repo: repo.into() })?;
        Ok(self.public_key(Self::REPOSITORY_KEY_ID, false))
    }

    async fn put_environment_secret(
        &self,
        repo: &str,
        environment: &str,
        secret: &SealedSecret,
    ) -> Result<(), RemoteError> {
        self.record(RemoteCall::EnvironmentSecret {
            repo: repo.into(),
            environment: environment.into(),
            name: secret.name.clone(),
            encrypted_value: secret.encrypted_value.clone(),
            key_id: secret.key_id.clone(),
        })
    }

    async fn put_repository_secret(
        &self,
        repo: &str,
        secret: &SealedSecret,
    ) -> Result<(), RemoteError> {
        self.record(RemoteCall::RepositorySecret {
            repo: repo.into(),
            name: secret.name.clone(),
            encrypted_value: secret.encrypted_value.clone(),
            key_id: secret.key_id.clone(),
        })
    }

    async fn create_environment_variable(
        &self,
        repo: &str,
        environment: &str,
        name: &str,
        value: &str,
    ) -> Result<(), RemoteError> {
        self.record(RemoteCall::EnvironmentVariable {
            repo: repo.into(),
            environment: environment.into(),
            name: name.into(),
            value: value.into(),
        })
    }

    async fn create_repository_variable(
        &self,
        repo: &str,
        name: &str,
        value: &str,
    ) -> Result<(), RemoteError> {
        self.record(RemoteCall::RepositoryVariable {
            repo: repo.into(),
            name: name.into(),
            value: value.into(),
        })
    }
}
