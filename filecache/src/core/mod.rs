pub mod error;
pub mod file_cache;
pub mod path;
pub mod stream;
pub mod types;

pub use error::{FileCacheError, Result};
pub use file_cache::FileCache;
pub use stream::{ContentReader, StreamHandle, StreamReader};
pub use types::{CacheConfig, CacheEntry, CacheStats, Classification};
