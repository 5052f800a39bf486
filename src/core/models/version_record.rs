use std::path::PathBuf;

/// Where a configuration snapshot lives in version storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    /// Lowercase hex SHA-256 of the raw configuration bytes.
    pub hash: String,
    /// Full path of the snapshot file.
    pub path: PathBuf,
}

/// A stored snapshot as seen when listing the version directory.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredVersion {
    pub hash: String,
    pub path: PathBuf,
    pub modified: Option<chrono::DateTime<chrono::Utc>>,
}
