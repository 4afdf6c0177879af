//! Object storage seam and the filesystem-backed implementation.

use std::path::PathBuf;

use async_trait::async_trait;
use hyper::body::Bytes;
use rand::{Rng, distr::Alphanumeric};
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::constants::{DEFAULT_EXTENSION, STORAGE_KEY_SUFFIX_LEN};
use crate::error::PicstashError;

/// Binary object store collaborator.
///
/// Objects are written once and never updated; key collisions overwrite
/// silently, and deletion policy belongs to the store itself.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str)
    -> Result<(), PicstashError>;
}

/// Store backed by a single local directory.
pub struct FilesystemStore {
    root_dir: PathBuf,
}

impl FilesystemStore {
    pub fn new(root_dir: PathBuf) -> Result<Self, PicstashError> {
        if root_dir.exists() && !root_dir.is_dir() {
            return Err(PicstashError::Configuration(format!(
                "Storage root '{}' is not a directory",
                root_dir.display()
            )));
        }
        std::fs::create_dir_all(&root_dir)?;
        Ok(Self { root_dir })
    }
}

#[async_trait]
impl ObjectStore for FilesystemStore {
    async fn put(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), PicstashError> {
        // Generated keys never contain path segments; reject anything else
        // before it touches the filesystem.
        if key.contains(['/', '\\']) || key.contains("..") {
            return Err(PicstashError::StorageWriteFailed(format!(
                "invalid storage key '{}'",
                key
            )));
        }

        let file_path = self.root_dir.join(key);
        debug!(
            key = %key,
            path = ?file_path,
            size = bytes.len(),
            content_type = %content_type,
            "Writing object"
        );

        // Write atomically by writing to a temp file and renaming
        let temp_path = file_path.with_extension("tmp");
        let mut file = async_fs::File::create(&temp_path)
            .await
            .map_err(|e| PicstashError::StorageWriteFailed(e.to_string()))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| PicstashError::StorageWriteFailed(e.to_string()))?;
        file.sync_all()
            .await
            .map_err(|e| PicstashError::StorageWriteFailed(e.to_string()))?;
        drop(file);

        async_fs::rename(&temp_path, &file_path)
            .await
            .map_err(|e| PicstashError::StorageWriteFailed(e.to_string()))?;

        debug!(key = %key, "Object written");
        Ok(())
    }
}

/// Extension for a storage key: the substring after the uploaded filename's
/// last `.`, or [`DEFAULT_EXTENSION`] when there is none.
pub fn extension_for(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext,
        _ => DEFAULT_EXTENSION,
    }
}

/// Generate a storage key: upload-time millis plus a short random
/// alphanumeric suffix.
///
/// Best-effort unique at the expected single-admin request volume; no
/// existence check is made against the store.
pub fn generate_storage_key(file_name: &str, now_millis: i64) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STORAGE_KEY_SUFFIX_LEN)
        .map(char::from)
        .collect();

    format!(
        "{}-{}.{}",
        now_millis,
        suffix.to_ascii_lowercase(),
        extension_for(file_name)
    )
}
