//! Local directory listing as a snapshot source.
//!
//! Each fetch lists the immediate children of one directory. A directory that
//! cannot be read fails the whole fetch, so the poller keeps its previous
//! contents instead of deleting everything.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use pollsync_core::{Fetcher, SyncError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, instrument, warn};

/// A file or folder entry from a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Absolute path of the entry
    pub path: String,
    /// Whether this is a folder
    pub is_folder: bool,
    /// Size in bytes (0 for folders)
    pub size_bytes: u64,
    /// Last modified timestamp (Unix seconds)
    pub modified_at: i64,
    /// Hex SHA-256 of the contents (files only, when hashing is enabled)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

/// Lists one directory per fetch, keyed by entry name.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    include_hidden: bool,
    extension: Option<String>,
    hash_contents: bool,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include_hidden: false,
            extension: None,
            hash_contents: false,
        }
    }

    /// Include names starting with `.`.
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Only list files ending with this extension (case-insensitive). Folders are always listed.
    pub fn extension(mut self, extension: Option<String>) -> Self {
        self.extension = extension.map(|ext| {
            let ext = ext.to_lowercase();
            if ext.starts_with('.') {
                ext
            } else {
                format!(".{}", ext)
            }
        });
        self
    }

    /// Hash file contents so edits that keep size and mtime are still detected.
    pub fn hash_contents(mut self, hash: bool) -> Self {
        self.hash_contents = hash;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn accepts(&self, name: &str, is_folder: bool) -> bool {
        if !self.include_hidden && name.starts_with('.') {
            return false;
        }
        match (&self.extension, is_folder) {
            (Some(ext), false) => name.to_lowercase().ends_with(ext.as_str()),
            _ => true,
        }
    }

    /// List the directory into `(name, entry)` pairs, folders first, then by name.
    pub async fn list(&self) -> Result<Vec<(String, FileEntry)>, SyncError> {
        let metadata = fs::metadata(&self.root).await.map_err(|e| {
            SyncError::Io(format!(
                "Failed to stat directory {}: {}",
                self.root.display(),
                e
            ))
        })?;
        if !metadata.is_dir() {
            return Err(SyncError::Io(format!(
                "Path is not a directory: {}",
                self.root.display()
            )));
        }

        let mut read_dir = fs::read_dir(&self.root).await.map_err(|e| {
            SyncError::Io(format!(
                "Failed to read directory {}: {}",
                self.root.display(),
                e
            ))
        })?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await.map_err(|e| {
            SyncError::Io(format!(
                "Failed to read directory {}: {}",
                self.root.display(),
                e
            ))
        })? {
            let name = entry.file_name().to_string_lossy().to_string();

            let path = entry.path();

            // Follows symlinks, so a link to a folder is listed as a folder
            let metadata = match fs::metadata(&path).await {
                Ok(m) => m,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    // Removed between listing and stat, or a dangling symlink
                    debug!("Skipping {}: {}", name, e);
                    continue;
                }
                Err(e) => {
                    return Err(SyncError::Io(format!(
                        "Failed to stat {}: {}",
                        path.display(),
                        e
                    )));
                }
            };

            let is_folder = metadata.is_dir();
            if !self.accepts(&name, is_folder) {
                continue;
            }

            let modified_at = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0);

            let content_hash = if self.hash_contents && !is_folder {
                match fs::read(&path).await {
                    Ok(data) => Some(hex::encode(Sha256::digest(&data))),
                    Err(e) if e.kind() == ErrorKind::NotFound => {
                        debug!("Skipping {}: {}", name, e);
                        continue;
                    }
                    Err(e) => {
                        // Still listed: only the hash is unknown this cycle
                        warn!("Failed to hash {}: {}", path.display(), e);
                        None
                    }
                }
            } else {
                None
            };

            entries.push((
                name,
                FileEntry {
                    path: path.to_string_lossy().to_string(),
                    is_folder,
                    size_bytes: if is_folder { 0 } else { metadata.len() },
                    modified_at,
                    content_hash,
                },
            ));
        }

        // Sort: folders first, then by name
        entries.sort_by(|(a_name, a), (b_name, b)| match (a.is_folder, b.is_folder) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            _ => a_name.to_lowercase().cmp(&b_name.to_lowercase()),
        });

        debug!("Listed {} entries in {}", entries.len(), self.root.display());
        Ok(entries)
    }
}

#[async_trait]
impl Fetcher<FileEntry> for DirectorySource {
    type Snapshot = Vec<(String, FileEntry)>;

    #[instrument(skip(self), level = "debug", fields(root = %self.root.display()))]
    async fn fetch(&self) -> Result<Self::Snapshot, SyncError> {
        self.list().await
    }
}
