//! Key-addressed image cache on the local filesystem
//!
//! Each cached image lives at `<directory>/<sanitized key>.<extension>`; the
//! file itself is the cache entry and no manifest is kept.
//!
//! The filename depends only on the key, never on the URL or the bytes. A
//! node re-rendered remotely under the same id keeps being served from the
//! stale file until the directory is cleared with
//! [`ContentAddressedCache::clear`].
//!
//! Writes go to a uniquely named temporary file that is then renamed into
//! place, so a reader never sees a partial image. There is no locking: two
//! processes missing the same key both download, and the last rename wins.

use crate::domain::{CacheError, Result};
use reqwest::Client;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Default extension for cached files
pub const DEFAULT_EXTENSION: &str = "png";

/// Filesystem cache for downloaded images
#[derive(Debug, Clone)]
pub struct ContentAddressedCache {
    directory: PathBuf,
    extension: String,
    http: Client,
}

impl ContentAddressedCache {
    /// Create a cache rooted at `directory`
    ///
    /// The directory is created lazily by the first write. `http` is used
    /// as-is for downloads and should not carry API credentials; render URLs
    /// are pre-signed.
    pub fn new(directory: impl Into<PathBuf>, http: Client) -> Self {
        Self {
            directory: directory.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            http,
        }
    }

    /// Use `extension` for cached filenames instead of `png`
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Root directory of the cache
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Location of the entry for `key`, whether or not it exists
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.directory
            .join(format!("{}.{}", sanitize_key(key), self.extension))
    }

    /// Return the cached file for `key`, downloading `remote_url` on a miss
    ///
    /// A hit performs no network access, even if `remote_url` differs from
    /// the URL the entry was originally downloaded from.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] or [`CacheError::DownloadFailed`]
    /// if the download fails, and [`CacheError::WriteFailed`] if the file
    /// can't be written.
    pub async fn resolve(&self, key: &str, remote_url: &str) -> Result<PathBuf> {
        let path = self.path_for(key);

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!(key = %key, path = %path.display(), "Cache hit");
            return Ok(path);
        }

        tracing::debug!(key = %key, "Cache miss, downloading");
        let bytes = self.download(remote_url).await?;
        self.write(&path, &bytes).await?;

        tracing::debug!(
            key = %key,
            path = %path.display(),
            bytes = bytes.len(),
            "Cached image"
        );
        Ok(path)
    }

    /// Remove the whole cache directory
    ///
    /// Succeeds if the directory doesn't exist.
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.directory).await {
            Ok(()) => {
                tracing::info!(path = %self.directory.display(), "Cleared image cache");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.directory.display(), "Cache directory already absent");
                Ok(())
            }
            Err(e) => Err(CacheError::ClearFailed {
                path: self.directory.display().to_string(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| CacheError::Connection {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CacheError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let bytes = resp.bytes().await.map_err(|e| CacheError::Connection {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let write_failed = |e: std::io::Error| CacheError::WriteFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(write_failed)?;

        let staging = path.with_extension(format!("{}.{}.part", self.extension, uuid::Uuid::new_v4()));
        if let Err(e) = tokio::fs::write(&staging, bytes).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(write_failed(e).into());
        }
        if let Err(e) = tokio::fs::rename(&staging, path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(write_failed(e).into());
        }
        Ok(())
    }
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_`
///
/// Node ids like `12:345` become `12_345`. Distinct keys can collide after
/// sanitizing (`1:2` and `1;2`); provider ids don't in practice.
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    #[test_case("12:345", "12_345" ; "colon")]
    #[test_case("I1:2;3:4", "I1_2_3_4" ; "instance path")]
    #[test_case("../etc/passwd", "___etc_passwd" ; "traversal")]
    #[test_case("plain-key_1", "plain-key_1" ; "already safe")]
    fn test_sanitize_key(input: &str, expected: &str) {
        assert_eq!(sanitize_key(input), expected);
    }

    #[test]
    fn test_path_for_uses_key_and_extension() {
        let cache = ContentAddressedCache::new("/tmp/cache", Client::new()).with_extension("jpg");
        assert_eq!(cache.path_for("1:2"), PathBuf::from("/tmp/cache/1_2.jpg"));
    }

    #[tokio::test]
    async fn test_hit_skips_network() {
        let dir = TempDir::new().unwrap();
        let cache = ContentAddressedCache::new(dir.path(), Client::new());

        let path = cache.path_for("1:2");
        std::fs::write(&path, [9u8, 9, 9]).unwrap();

        // Unroutable URL: a network attempt would fail the call
        let resolved = cache
            .resolve("1:2", "http://127.0.0.1:9/never.png")
            .await
            .unwrap();
        assert_eq!(resolved, path);
        assert_eq!(std::fs::read(&resolved).unwrap(), vec![9u8, 9, 9]);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("images");
        let cache = ContentAddressedCache::new(&root, Client::new());

        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("a.png"), b"x").unwrap();

        cache.clear().await.unwrap();
        assert!(!root.exists());

        cache.clear().await.unwrap();
    }
}
