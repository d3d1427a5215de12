use super::error::{FileCacheError, Result};
use super::path::normalize;
use super::stream::{self, ContentReader, StreamHandle};
use super::types::{CacheConfig, CacheEntry, CacheStats, Classification};
use bytes::Bytes;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Size-aware file content cache.
///
/// Files up to `max_buffer_size` bytes are held in memory; larger files are
/// only remembered and streamed from disk on every read. All state sits
/// behind one reader/writer lock: `update` and `delete` take it exclusively,
/// lookups share it.
#[derive(Clone)]
pub struct FileCache {
    entries: Arc<RwLock<HashMap<PathBuf, CacheEntry>>>,
    stats: Arc<parking_lot::RwLock<CacheStats>>,
    config: CacheConfig,
}

impl FileCache {
    /// Create a cache that buffers files up to `max_buffer_size` bytes
    pub fn new(max_buffer_size: u64) -> Self {
        Self::build(CacheConfig::with_max_buffer_size(max_buffer_size))
    }

    /// Create a cache from a full configuration
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: CacheConfig) -> Self {
        info!(
            "Initializing file cache with max_buffer_size={}, chunk_size={}",
            config.max_buffer_size, config.stream_chunk_size
        );

        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(parking_lot::RwLock::new(CacheStats::default())),
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Ingest the current content of `path`.
    ///
    /// Returns the classification now held for the path. On error any
    /// previous entry for the path is left as it was.
    pub async fn update(&self, path: impl AsRef<Path>) -> Result<Classification> {
        let key = normalize(path.as_ref())?;

        let mut entries = self.entries.write().await;
        let result = self.load_entry(&key).await;

        let mut stats = self.stats.write();
        match result {
            Ok(entry) => {
                let classification = entry.classification();
                debug!(
                    "UPDATE path={}, kind={:?}, size={}",
                    key.display(),
                    classification,
                    entry.buffered_len()
                );
                entries.insert(key, entry);
                Self::refresh_gauges(&mut stats, &entries);
                stats.updates += 1;
                Ok(classification)
            }
            Err(e) => {
                warn!("UPDATE failed path={}: {}", key.display(), e);
                stats.update_failures += 1;
                Err(e)
            }
        }
    }

    /// Stat and, when small enough, read the file. Must run under the
    /// exclusive lock.
    async fn load_entry(&self, key: &Path) -> Result<CacheEntry> {
        let metadata =
            tokio::fs::metadata(key)
                .await
                .map_err(|e| FileCacheError::NotAccessible {
                    path: key.to_path_buf(),
                    source: e,
                })?;

        if !metadata.is_file() {
            return Err(FileCacheError::NotAccessible {
                path: key.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }

        if metadata.len() > self.config.max_buffer_size {
            return Ok(CacheEntry::Streamed);
        }

        let read_error = |e: io::Error| FileCacheError::ReadError {
            path: key.to_path_buf(),
            source: e,
        };
        let file = File::open(key).await.map_err(read_error)?;

        // One byte past the limit is enough to tell the file outgrew it
        let limit = self.config.max_buffer_size.saturating_add(1);
        let mut data = Vec::with_capacity(metadata.len() as usize);
        file.take(limit)
            .read_to_end(&mut data)
            .await
            .map_err(read_error)?;

        // File grew between stat and read
        if data.len() as u64 > self.config.max_buffer_size {
            return Ok(CacheEntry::Streamed);
        }

        Ok(CacheEntry::Buffered(Bytes::from(data)))
    }

    /// Forget `path`. Removing an unknown path is a no-op.
    ///
    /// Returns whether an entry was removed.
    pub async fn delete(&self, path: impl AsRef<Path>) -> bool {
        let key = match normalize(path.as_ref()) {
            Ok(key) => key,
            Err(e) => {
                debug!("DELETE ignored: {}", e);
                return false;
            }
        };

        let mut entries = self.entries.write().await;
        let removed = entries.remove(&key);

        if removed.is_some() {
            debug!("DELETE path={}", key.display());
            let mut stats = self.stats.write();
            Self::refresh_gauges(&mut stats, &entries);
            stats.deletes += 1;
            true
        } else {
            false
        }
    }

    /// Classify `path` without reading anything
    pub async fn identify(&self, path: impl AsRef<Path>) -> Classification {
        let Ok(key) = normalize(path.as_ref()) else {
            return Classification::NotFound;
        };

        let entries = self.entries.read().await;
        entries
            .get(&key)
            .map_or(Classification::NotFound, CacheEntry::classification)
    }

    /// Return the buffered content of `path` if it is held in memory.
    ///
    /// Streamed paths report their classification but no content; use
    /// [`FileCache::get`] to open a stream.
    pub async fn get_cached(&self, path: impl AsRef<Path>) -> (Option<Bytes>, Classification) {
        let Ok(key) = normalize(path.as_ref()) else {
            self.record_get(false);
            return (None, Classification::NotFound);
        };

        let entries = self.entries.read().await;
        let result = match entries.get(&key) {
            Some(CacheEntry::Buffered(data)) => (Some(data.clone()), Classification::Cached),
            Some(CacheEntry::Streamed) => (None, Classification::Streamed),
            None => (None, Classification::NotFound),
        };
        drop(entries);

        self.record_get(result.1.is_found());
        result
    }

    /// Open a reader over the content of `path`.
    ///
    /// Buffered paths return a reader over memory and no handle. Streamed
    /// paths open the file and start a background copy; the returned handle
    /// can cancel it.
    pub async fn get(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<(ContentReader, Option<StreamHandle>)> {
        let key = normalize(path.as_ref())?;

        let entry = self.entries.read().await.get(&key).cloned();

        match entry {
            Some(CacheEntry::Buffered(data)) => {
                self.record_get(true);
                Ok((ContentReader::buffered(data), None))
            }
            Some(CacheEntry::Streamed) => {
                let file = match File::open(&key).await {
                    Ok(file) => file,
                    Err(e) => {
                        self.record_get(false);
                        return Err(FileCacheError::NotAccessible {
                            path: key,
                            source: e,
                        });
                    }
                };
                self.record_get(true);

                debug!("STREAM start path={}", key.display());
                self.stats.write().streams_started += 1;

                let (reader, handle) = stream::spawn_copy(
                    key,
                    file,
                    self.config.stream_chunk_size,
                    self.config.stream_channel_capacity,
                );
                Ok((ContentReader::Streamed(reader), Some(handle)))
            }
            None => {
                self.record_get(false);
                Err(FileCacheError::NotFound(key))
            }
        }
    }

    /// Number of known paths
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Get statistics
    pub fn stats(&self) -> CacheStats {
        self.stats.read().clone()
    }

    fn record_get(&self, hit: bool) {
        let mut stats = self.stats.write();
        stats.gets += 1;
        if !hit {
            stats.misses += 1;
        }
    }

    /// Recompute entry gauges after a mutation
    fn refresh_gauges(stats: &mut CacheStats, entries: &HashMap<PathBuf, CacheEntry>) {
        stats.buffered_bytes = entries.values().map(CacheEntry::buffered_len).sum();
        stats.buffered_entries = entries
            .values()
            .filter(|e| matches!(e, CacheEntry::Buffered(_)))
            .count();
        stats.streamed_entries = entries.len() - stats.buffered_entries;
    }
}
