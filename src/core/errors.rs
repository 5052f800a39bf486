use std::path::PathBuf;

use crate::core::traits::remote::RemoteError;

/// All domain errors for envsync.
///
/// Each variant provides enough context to diagnose the issue
/// without needing a debugger.
#[derive(Debug, thiserror::Error)]
pub enum EnvsyncError {
    #[error(
        "Cannot read configuration file {path}: {source}\n\n  \
         Check that the path is correct and the file is readable.\n  \
         Use --config <path> to point at a different file."
    )]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "Parse error in {path}: {detail}\n\n  \
         Expected a JSON object with 'servers', 'configs' and 'repositories'."
    )]
    ConfigParse { path: PathBuf, detail: String },

    #[error(
        "Missing key: {path}\n\n  \
         The configuration does not define this entry.\n  \
         Run 'envsync check' to list every dangling reference."
    )]
    MissingKey { path: String },

    #[error("Cannot initialize version storage at {path}: {detail}")]
    StorageInit { path: PathBuf, detail: String },

    #[error("Cannot write version snapshot {path}: {detail}")]
    StorageWrite { path: PathBuf, detail: String },

    #[error(
        "Version '{hash}' not found\n\n  \
         Run 'envsync versions' to list stored snapshots."
    )]
    VersionNotFound { hash: String },

    #[error("{step} failed for {target}: {source}")]
    Remote {
        step: String,
        target: String,
        source: RemoteError,
    },

    #[error("Sealing failed: {reason}")]
    Seal { reason: String },

    #[error(
        "Missing credential: {name}\n\n  \
         Export {env_var} or pass it on the command line."
    )]
    MissingCredential { name: String, env_var: String },

    #[error("Invalid selection '{input}': expected a number between 1 and {max}")]
    InvalidSelection { input: String, max: usize },

    #[error(
        "Configuration check found {errors} error(s)\n\n  \
         Fix the entries listed above before running 'envsync apply'."
    )]
    CheckFailed { errors: usize },

    #[error("Invalid argument: {detail}")]
    InvalidArgument { detail: String },

    #[error("Audit log error: {detail}")]
    Audit { detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EnvsyncError {
    /// Shorthand for a missing key built from path segments.
    pub fn missing<S: AsRef<str>>(segments: &[S]) -> Self {
        let path = segments
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join(".");
        EnvsyncError::MissingKey { path }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EnvsyncError>;
