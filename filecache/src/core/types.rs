use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::error::{FileCacheError, Result};

/// Default threshold above which files are streamed instead of buffered (2 MiB)
pub const DEFAULT_MAX_BUFFER_SIZE: u64 = 2 * 1024 * 1024;
/// Default size of a single chunk sent through a stream pipe (64 KiB)
pub const DEFAULT_STREAM_CHUNK_SIZE: usize = 64 * 1024;
/// Default number of chunks that may sit in a stream pipe unread
pub const DEFAULT_STREAM_CHANNEL_CAPACITY: usize = 8;

/// A single cached entry.
///
/// Buffered and streamed are variants of one value, so a key can never be
/// classified as both at once.
#[derive(Debug, Clone)]
pub enum CacheEntry {
    /// Full content as of the last update
    Buffered(Bytes),
    /// Known file, too large to hold in memory; read from disk on access
    Streamed,
}

impl CacheEntry {
    /// Classification of this entry
    pub fn classification(&self) -> Classification {
        match self {
            Self::Buffered(_) => Classification::Cached,
            Self::Streamed => Classification::Streamed,
        }
    }

    /// Bytes held in memory by this entry
    pub fn buffered_len(&self) -> usize {
        match self {
            Self::Buffered(data) => data.len(),
            Self::Streamed => 0,
        }
    }
}

/// What the cache knows about a path
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// No entry for the path
    NotFound,
    /// Content is held in memory
    Cached,
    /// Content is read from disk on each access
    Streamed,
}

impl Classification {
    pub fn is_cached(self) -> bool {
        self == Self::Cached
    }

    pub fn is_streamed(self) -> bool {
        self == Self::Streamed
    }

    pub fn is_found(self) -> bool {
        self != Self::NotFound
    }
}

/// Configuration for the file cache
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheConfig {
    /// Files larger than this many bytes are streamed
    pub max_buffer_size: u64,
    /// Read size used by the streaming copy task
    pub stream_chunk_size: usize,
    /// Chunks buffered in a stream pipe before the copy task waits
    pub stream_channel_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            stream_chunk_size: DEFAULT_STREAM_CHUNK_SIZE,
            stream_channel_capacity: DEFAULT_STREAM_CHANNEL_CAPACITY,
        }
    }
}

impl CacheConfig {
    /// Config with the given threshold and default streaming parameters
    pub fn with_max_buffer_size(max_buffer_size: u64) -> Self {
        Self {
            max_buffer_size,
            ..Default::default()
        }
    }

    /// Reject values the streaming pipe cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.stream_chunk_size == 0 {
            return Err(FileCacheError::Config(
                "stream_chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.stream_channel_capacity == 0 {
            return Err(FileCacheError::Config(
                "stream_channel_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Statistics for the file cache
#[derive(Debug, Default, Clone, Serialize)]
pub struct CacheStats {
    /// Entries currently held in memory
    pub buffered_entries: usize,
    /// Entries currently marked for streaming
    pub streamed_entries: usize,
    /// Total bytes held by buffered entries
    pub buffered_bytes: usize,
    /// Successful update operations
    pub updates: u64,
    /// Update operations that returned an error
    pub update_failures: u64,
    /// Delete operations that removed an entry
    pub deletes: u64,
    /// GET operations (including get_cached)
    pub gets: u64,
    /// GET operations for paths with no entry
    pub misses: u64,
    /// Streaming copies started
    pub streams_started: u64,
}

impl CacheStats {
    /// Total number of entries
    pub fn total_entries(&self) -> usize {
        self.buffered_entries + self.streamed_entries
    }

    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        if self.gets == 0 {
            0.0
        } else {
            (self.gets - self.misses) as f64 / self.gets as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_classification() {
        let entry = CacheEntry::Buffered(Bytes::from_static(b"hello"));
        assert_eq!(entry.classification(), Classification::Cached);
        assert_eq!(entry.buffered_len(), 5);

        assert_eq!(CacheEntry::Streamed.classification(), Classification::Streamed);
        assert_eq!(CacheEntry::Streamed.buffered_len(), 0);
    }

    #[test]
    fn test_config_validation() {
        assert!(CacheConfig::default().validate().is_ok());

        let config = CacheConfig {
            stream_chunk_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(FileCacheError::Config(_))));

        let config = CacheConfig {
            stream_channel_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_stats_hit_rate() {
        let mut stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);

        stats.gets = 4;
        stats.misses = 1;
        assert_eq!(stats.hit_rate(), 0.75);
    }
}
