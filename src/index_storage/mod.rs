//! Persistent line-index storage
//!
//! Each indexed source file owns one directory, `.cache/<basename>/`, holding:
//! - `metadata.json`: mtime, size, partition count and partition size
//! - `partitions/p-<i>.json`: byte offset and cumulative line lengths of partition `i`
//!
//! Records are never mutated in place. A stale index is deleted wholesale and
//! rebuilt, with metadata written last so an interrupted build reads as a miss.

pub mod metadata;
pub mod partition;
pub mod persistence;

pub use metadata::{CacheMetadata, SourceStamp};
pub use partition::Partition;
pub use persistence::{CACHE_DIRNAME, CacheStore};
