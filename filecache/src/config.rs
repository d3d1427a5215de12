use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::CacheConfig;
use crate::core::types::{
    DEFAULT_MAX_BUFFER_SIZE, DEFAULT_STREAM_CHANNEL_CAPACITY, DEFAULT_STREAM_CHUNK_SIZE,
};

/// Top-level configuration for a host embedding the file cache
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileCacheConfig {
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSection {
    /// Files above this size in bytes are streamed from disk
    #[serde(default = "default_max_buffer_size")]
    pub max_buffer_size: u64,
    #[serde(default = "default_stream_chunk_size")]
    pub stream_chunk_size: usize,
    #[serde(default = "default_stream_channel_capacity")]
    pub stream_channel_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set
    pub level: String,
    /// `json` or `pretty`
    pub format: String,
}

fn default_max_buffer_size() -> u64 {
    DEFAULT_MAX_BUFFER_SIZE
}

fn default_stream_chunk_size() -> usize {
    DEFAULT_STREAM_CHUNK_SIZE
}

fn default_stream_channel_capacity() -> usize {
    DEFAULT_STREAM_CHANNEL_CAPACITY
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            stream_chunk_size: DEFAULT_STREAM_CHUNK_SIZE,
            stream_channel_capacity: DEFAULT_STREAM_CHANNEL_CAPACITY,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl FileCacheConfig {
    /// Load configuration from YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: FileCacheConfig = serde_yaml::from_str(&content)?;
        config.to_cache_config().validate()?;
        Ok(config)
    }

    /// Convert to CacheConfig
    pub fn to_cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_buffer_size: self.cache.max_buffer_size,
            stream_chunk_size: self.cache.stream_chunk_size,
            stream_channel_capacity: self.cache.stream_channel_capacity,
        }
    }
}
