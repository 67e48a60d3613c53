//! Line index construction and validation
//!
//! # Cache Strategy
//!
//! - **Validation**: the persisted metadata is reused only when its mtime, size
//!   and partition size all equal the current values exactly.
//!
//! - **Cache miss**: missing, unreadable, malformed or mismatching metadata is
//!   not an error. The per-file cache directory is wiped and rebuilt in full.
//!
//! - **Durability**: partitions are written before metadata, so an interrupted
//!   build is indistinguishable from a miss on the next run.
//!
//! - **No locking**: two processes rebuilding the same source concurrently can
//!   interfere with each other.

pub mod builder;
pub mod locator;

pub use builder::{IndexStats, PartitionAccumulator, build_index};
pub use locator::LineLocation;

use std::path::Path;

use tracing::debug;

use crate::config::PartitionSize;
use crate::error::Result;
use crate::index_storage::{CacheMetadata, CacheStore, SourceStamp};
use crate::utils::CancelToken;

/// Return the persisted metadata if it may be reused for `stamp` and `partition_size`
pub fn validate_cache(store: &CacheStore, stamp: &SourceStamp, partition_size: PartitionSize) -> Option<CacheMetadata> {
    let Some(metadata) = store.load_metadata() else {
        debug!("No usable cache metadata at {}", store.metadata_path().display());
        return None;
    };

    if !metadata.matches(stamp, partition_size) {
        debug!(
            "Cache metadata is stale (cached mtime={} size={} partitionSize={}, current mtime={} size={} partitionSize={})",
            metadata.mtime, metadata.size, metadata.partition_size, stamp.mtime, stamp.size, partition_size
        );
        return None;
    }

    Some(metadata)
}

/// Wipe the cache for `source` and build it again from scratch
pub fn rebuild(
    source: &Path,
    store: &CacheStore,
    partition_size: PartitionSize,
    stamp: SourceStamp,
    cancel: &CancelToken,
) -> Result<(CacheMetadata, IndexStats)> {
    store.reset()?;
    build_index(source, store, partition_size, stamp, cancel)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_validate_cache_miss_then_hit() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("lines.txt");
        fs::write(&source, "a\nbb\n").unwrap();

        let store = CacheStore::new(dir.path(), &source).unwrap();
        let stamp = SourceStamp::from_path(&source).unwrap();
        let size = PartitionSize::new(2).unwrap();

        assert!(validate_cache(&store, &stamp, size).is_none());

        let (metadata, _) = rebuild(&source, &store, size, stamp, &CancelToken::new()).unwrap();
        assert_eq!(validate_cache(&store, &stamp, size), Some(metadata));

        // Different partition size is a miss
        assert!(validate_cache(&store, &stamp, PartitionSize::new(4).unwrap()).is_none());

        // Different size is a miss
        let grown = SourceStamp { size: stamp.size + 1, ..stamp };
        assert!(validate_cache(&store, &grown, size).is_none());
    }

    #[test]
    fn test_rebuild_removes_stale_partitions() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("lines.txt");
        fs::write(&source, "1\n2\n3\n4\n5\n").unwrap();

        let store = CacheStore::new(dir.path(), &source).unwrap();
        let cancel = CancelToken::new();
        let stamp = SourceStamp::from_path(&source).unwrap();

        rebuild(&source, &store, PartitionSize::new(1).unwrap(), stamp, &cancel).unwrap();
        assert!(store.partition_path(4).exists());

        let (metadata, _) = rebuild(&source, &store, PartitionSize::new(4).unwrap(), stamp, &cancel).unwrap();
        assert_eq!(metadata.partition_count, 2);
        assert!(!store.partition_path(4).exists());
        assert!(!store.partition_path(2).exists());
    }
}
