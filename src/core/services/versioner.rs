use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::core::errors::{EnvsyncError, Result};
use crate::core::models::document::ConfigDocument;
use crate::core::models::version_record::{StoredVersion, VersionRecord};

/// Owns the configuration file for one run.
///
/// The file is read once; the raw text is kept for fingerprinting and
/// snapshots, the parsed document is lent to the resolver.
#[derive(Debug)]
pub struct ContentVersioner {
    source_path: PathBuf,
    raw: String,
    document: ConfigDocument,
}

impl ContentVersioner {
    /// Read and parse the configuration at `path`.
    ///
    /// # Errors
    ///
    /// - `ConfigLoad` if the file is missing or unreadable.
    /// - `ConfigParse` if the text is not JSON of the expected shape.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| EnvsyncError::ConfigLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_text(path, raw)
    }

    /// Parse already-read text as if it came from `path`.
    pub fn from_text(path: &Path, raw: String) -> Result<Self> {
        let document: ConfigDocument =
            serde_json::from_str(&raw).map_err(|e| EnvsyncError::ConfigParse {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;

        Ok(Self {
            source_path: path.to_path_buf(),
            raw,
            document,
        })
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    /// Lowercase hex SHA-256 of the raw bytes exactly as read.
    pub fn fingerprint(&self) -> String {
        fingerprint(self.raw.as_bytes())
    }

    /// Store a copy of the raw content under its fingerprint.
    ///
    /// The copy is written as a JSON string literal. An existing file with
    /// the same name is never touched, so repeated snapshots of unchanged
    /// content write nothing.
    pub fn snapshot(&self, store_dir: &Path) -> Result<VersionRecord> {
        ensure_store_dir(store_dir)?;

        let hash = self.fingerprint();
        let path = store_dir.join(&hash);

        let encoded = serde_json::to_string(&self.raw).map_err(|e| EnvsyncError::StorageWrite {
            path: path.clone(),
            detail: e.to_string(),
        })?;

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(encoded.as_bytes())
                    .map_err(|e| EnvsyncError::StorageWrite {
                        path: path.clone(),
                        detail: e.to_string(),
                    })?;
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(EnvsyncError::StorageWrite {
                    path,
                    detail: e.to_string(),
                });
            }
        }

        Ok(VersionRecord { hash, path })
    }
}

/// Compute the SHA256 hex digest of the given bytes.
pub fn fingerprint(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Make sure `dir` exists and is a directory.
fn ensure_store_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Err(EnvsyncError::StorageInit {
            path: dir.to_path_buf(),
            detail: "empty path".into(),
        });
    }

    if dir.exists() {
        if !dir.is_dir() {
            return Err(EnvsyncError::StorageInit {
                path: dir.to_path_buf(),
                detail: "exists but is not a directory".into(),
            });
        }
        return Ok(());
    }

    fs::create_dir_all(dir).map_err(|e| EnvsyncError::StorageInit {
        path: dir.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Read-side access to the version directory.
pub struct VersionStore;

impl VersionStore {
    /// List stored snapshots, newest first.
    ///
    /// Only files named by a 64-character lowercase hex digest count as
    /// snapshots. A missing directory yields an empty list.
    pub fn list(&self, store_dir: &Path) -> Result<Vec<StoredVersion>> {
        if !store_dir.exists() {
            return Ok(Vec::new());
        }

        let mut versions = Vec::new();
        for entry in fs::read_dir(store_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if !is_fingerprint(&name) || !entry.file_type()?.is_file() {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .map(chrono::DateTime::<chrono::Utc>::from);
            versions.push(StoredVersion {
                hash: name,
                path: entry.path(),
                modified,
            });
        }

        versions.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.hash.cmp(&b.hash)));
        Ok(versions)
    }

    /// Decode a stored snapshot back to the original configuration text.
    pub fn read(&self, store_dir: &Path, hash: &str) -> Result<String> {
        let path = store_dir.join(hash);
        if !is_fingerprint(hash) || !path.is_file() {
            return Err(EnvsyncError::VersionNotFound {
                hash: hash.to_string(),
            });
        }

        let content = fs::read_to_string(&path)?;
        serde_json::from_str::<String>(&content).map_err(|e| EnvsyncError::ConfigParse {
            path,
            detail: format!("snapshot is not a JSON string: {e}"),
        })
    }
}

/// Whether `name` looks like a SHA-256 hex digest.
pub fn is_fingerprint(name: &str) -> bool {
    name.len() == 64 && name.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
