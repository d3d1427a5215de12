pub mod config;
pub mod core;
pub mod logging;

// Re-export commonly used types
pub use config::{FileCacheConfig, LoggingConfig};
pub use crate::core::{
    CacheConfig, CacheStats, Classification, ContentReader, FileCache, FileCacheError,
    StreamHandle,
};
pub use logging::init_tracing;
