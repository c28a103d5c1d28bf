//! On-disk cache of search results keyed by query.
//!
//! Layout: one `<sha256(query)>.json` file per query holding a [`CacheEntry`],
//! plus a `<sha256(query)>.json.lock` marker that exists only while the entry
//! is being written. Readers treat a locked key as a miss.
//!
//! The marker is advisory. It does not serialize writers: two writers of the
//! same query can overlap and the last one to finish wins.

use crate::types::ResultSet;
use chrono::{DateTime, Utc};
use delve_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const ENTRY_EXT: &str = "json";
const LOCK_EXT: &str = "lock";

/// A persisted search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Exact query string the results belong to
    pub query: String,

    pub results: ResultSet,

    pub created_at: DateTime<Utc>,
}

/// Summary of what is on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    /// Lock markers present (in-progress or abandoned writes)
    pub locked: usize,
    pub bytes: u64,
}

/// Storage key for a query: SHA-256 hex of the exact query string.
pub fn cache_key(query: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Search result cache.
#[derive(Debug, Clone)]
pub struct SearchCache {
    dir: Option<PathBuf>,
}

impl SearchCache {
    /// Cache stored under `dir` (created on first write).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// A cache that never hits and never stores.
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    pub fn directory(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    fn paths(&self, query: &str) -> Option<(PathBuf, PathBuf)> {
        let dir = self.dir.as_ref()?;
        let key = cache_key(query);
        let entry = dir.join(format!("{}.{}", key, ENTRY_EXT));
        let lock = dir.join(format!("{}.{}.{}", key, ENTRY_EXT, LOCK_EXT));
        Some((entry, lock))
    }

    /// Cached results for `query`, if a complete entry exists.
    ///
    /// Locked, unreadable, corrupt or mismatched entries are misses.
    pub async fn get(&self, query: &str) -> Option<ResultSet> {
        let (entry_path, lock_path) = self.paths(query)?;

        if tokio::fs::try_exists(&lock_path).await.unwrap_or(false) {
            tracing::debug!(query, "Cache entry is locked, treating as miss");
            return None;
        }

        let bytes = match tokio::fs::read(&entry_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(query, path = ?entry_path, "Failed to read cache entry: {}", e);
                return None;
            }
        };

        match serde_json::from_slice::<CacheEntry>(&bytes) {
            Ok(entry) if entry.query == query => {
                tracing::debug!(query, count = entry.results.len(), "Cache hit");
                Some(entry.results)
            }
            Ok(entry) => {
                tracing::warn!(
                    query,
                    stored = %entry.query,
                    "Cache entry belongs to a different query, ignoring"
                );
                None
            }
            Err(e) => {
                tracing::warn!(query, path = ?entry_path, "Corrupt cache entry, ignoring: {}", e);
                None
            }
        }
    }

    /// Store `results` for `query`.
    ///
    /// The lock marker is removed on every exit path, including errors.
    pub async fn put(&self, query: &str, results: &ResultSet) -> AppResult<()> {
        let Some((entry_path, lock_path)) = self.paths(query) else {
            return Ok(());
        };

        if let Some(dir) = entry_path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                AppError::Cache(format!("Failed to create cache directory {:?}: {}", dir, e))
            })?;
        }

        let _lock = WriteLock::acquire(lock_path).await?;

        let entry = CacheEntry {
            query: query.to_string(),
            results: results.clone(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_vec_pretty(&entry)?;

        tokio::fs::write(&entry_path, json).await.map_err(|e| {
            AppError::Cache(format!("Failed to write cache entry {:?}: {}", entry_path, e))
        })?;

        tracing::debug!(query, count = results.len(), "Cached search results");
        Ok(())
    }

    /// Count entries, lock markers and bytes on disk.
    pub async fn stats(&self) -> AppResult<CacheStats> {
        let mut stats = CacheStats::default();
        let Some(dir) = self.existing_dir().await else {
            return Ok(stats);
        };

        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            match path.extension().and_then(|ext| ext.to_str()) {
                Some(ENTRY_EXT) => {
                    stats.entries += 1;
                    stats.bytes += entry.metadata().await?.len();
                }
                Some(LOCK_EXT) => stats.locked += 1,
                _ => {}
            }
        }

        Ok(stats)
    }

    /// Delete every entry and lock marker. Returns the number of entries removed.
    pub async fn clear(&self) -> AppResult<usize> {
        let Some(dir) = self.existing_dir().await else {
            return Ok(0);
        };

        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            match path.extension().and_then(|ext| ext.to_str()) {
                Some(ENTRY_EXT) => {
                    tokio::fs::remove_file(&path).await?;
                    removed += 1;
                }
                Some(LOCK_EXT) => tokio::fs::remove_file(&path).await?,
                _ => {}
            }
        }

        tracing::info!(removed, "Cleared search cache");
        Ok(removed)
    }

    async fn existing_dir(&self) -> Option<&Path> {
        let dir = self.dir.as_deref()?;
        if tokio::fs::try_exists(dir).await.unwrap_or(false) {
            Some(dir)
        } else {
            None
        }
    }
}

/// Lock marker held for the duration of one cache write.
struct WriteLock {
    path: PathBuf,
}

impl WriteLock {
    async fn acquire(path: PathBuf) -> AppResult<Self> {
        tokio::fs::write(&path, b"").await.map_err(|e| {
            AppError::Cache(format!("Failed to create cache lock {:?}: {}", path, e))
        })?;
        Ok(Self { path })
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(path = ?self.path, "Failed to remove cache lock: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Document;
    use tempfile::TempDir;

    fn sample_results() -> ResultSet {
        vec![
            Document::new("Tokio", "https://tokio.rs", "An async runtime").with_summary("runtime"),
            Document::new("Empty", "https://empty.test", ""),
        ]
        .into()
    }

    fn lock_path(dir: &Path, query: &str) -> PathBuf {
        dir.join(format!("{}.json.lock", cache_key(query)))
    }

    #[test]
    fn test_cache_key_is_exact() {
        assert_eq!(cache_key("rust"), cache_key("rust"));
        assert_ne!(cache_key("rust"), cache_key("Rust"));
        assert_ne!(cache_key("rust"), cache_key("rust "));
        assert_eq!(cache_key("rust").len(), 64);
    }

    #[tokio::test]
    async fn test_round_trip() {
        let temp = TempDir::new().unwrap();
        let cache = SearchCache::new(temp.path().join("cache"));

        cache.put("tokio runtime", &sample_results()).await.unwrap();
        let cached = cache.get("tokio runtime").await.unwrap();

        assert_eq!(cached, sample_results());
        assert!(!lock_path(&temp.path().join("cache"), "tokio runtime").exists());
    }

    #[tokio::test]
    async fn test_unknown_query_is_absent() {
        let temp = TempDir::new().unwrap();
        let cache = SearchCache::new(temp.path());

        cache.put("known", &sample_results()).await.unwrap();
        assert!(cache.get("unknown").await.is_none());
        assert!(cache.get("Known").await.is_none());
    }

    #[tokio::test]
    async fn test_locked_entry_is_a_miss() {
        let temp = TempDir::new().unwrap();
        let cache = SearchCache::new(temp.path());
        cache.put("q", &sample_results()).await.unwrap();

        let lock = lock_path(temp.path(), "q");
        std::fs::write(&lock, b"").unwrap();
        assert!(cache.get("q").await.is_none());

        std::fs::remove_file(&lock).unwrap();
        assert!(cache.get("q").await.is_some());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let temp = TempDir::new().unwrap();
        let cache = SearchCache::new(temp.path());

        let entry = temp.path().join(format!("{}.json", cache_key("q")));
        std::fs::write(&entry, b"{ not json").unwrap();
        assert!(cache.get("q").await.is_none());

        // A fresh write replaces the corrupt entry
        cache.put("q", &sample_results()).await.unwrap();
        assert_eq!(cache.get("q").await.unwrap(), sample_results());
    }

    #[tokio::test]
    async fn test_lock_released_when_write_fails() {
        let temp = TempDir::new().unwrap();
        let cache = SearchCache::new(temp.path());

        // A directory where the entry file should go makes the write fail
        let entry = temp.path().join(format!("{}.json", cache_key("q")));
        std::fs::create_dir_all(&entry).unwrap();

        let result = cache.put("q", &sample_results()).await;
        assert!(matches!(result, Err(AppError::Cache(_))));
        assert!(!lock_path(temp.path(), "q").exists());
    }

    #[tokio::test]
    async fn test_disabled_cache() {
        let cache = SearchCache::disabled();
        assert!(!cache.is_enabled());

        cache.put("q", &sample_results()).await.unwrap();
        assert!(cache.get("q").await.is_none());
        assert_eq!(cache.stats().await.unwrap(), CacheStats::default());
    }

    /// Writers of the same key are not serialized; whichever finishes last
    /// is what readers see. Strict consistency here is a non-goal.
    #[tokio::test]
    async fn test_concurrent_writers_last_wins() {
        let temp = TempDir::new().unwrap();
        let cache = SearchCache::new(temp.path());

        let first: ResultSet = vec![Document::new("One", "https://one.test", "1")].into();
        let second: ResultSet = vec![Document::new("Two", "https://two.test", "2")].into();

        let (a, b) = tokio::join!(cache.put("same", &first), cache.put("same", &second));
        a.unwrap();
        b.unwrap();

        let cached = cache.get("same").await.unwrap();
        assert!(cached == first || cached == second);
        assert!(!lock_path(temp.path(), "same").exists());
    }

    #[tokio::test]
    async fn test_stats_and_clear() {
        let temp = TempDir::new().unwrap();
        let cache = SearchCache::new(temp.path());

        cache.put("a", &sample_results()).await.unwrap();
        cache.put("b", &sample_results()).await.unwrap();
        std::fs::write(lock_path(temp.path(), "c"), b"").unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.locked, 1);
        assert!(stats.bytes > 0);

        assert_eq!(cache.clear().await.unwrap(), 2);
        assert_eq!(cache.stats().await.unwrap(), CacheStats::default());
        assert!(cache.get("a").await.is_none());
    }
}
