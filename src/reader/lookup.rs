use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::range::{LineRange, read_range};
use crate::config::{Encoding, PartitionSize};
use crate::error::{Error, Result};
use crate::index_storage::{CacheMetadata, CacheStore, Partition, SourceStamp};
use crate::indexer::{self, IndexStats, validate_cache};
use crate::utils::CancelToken;

/// How [`LineIndex::open`] obtained its metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// The persisted index matched the source and was reused as is
    Reused,
    /// The index was built from scratch
    Rebuilt(IndexStats),
}

/// A validated line index for one source file
///
/// Holds only the metadata record. Every lookup loads the single partition
/// record it needs and reads the line's bytes straight from the source.
#[derive(Debug)]
pub struct LineIndex {
    source: PathBuf,
    store: CacheStore,
    metadata: CacheMetadata,
    partition_size: PartitionSize,
    encoding: Encoding,
    cancel: CancelToken,
}

impl LineIndex {
    /// Open the index of `source`, cached under `<cache_root>/.cache/`,
    /// rebuilding it when missing or stale
    pub fn open(
        source: &Path,
        cache_root: &Path,
        partition_size: PartitionSize,
        encoding: Encoding,
        cancel: &CancelToken,
    ) -> Result<(Self, CacheStatus)> {
        let stamp = SourceStamp::from_path(source)?;
        let store = CacheStore::new(cache_root, source)?;
        store.ensure_dirs()?;

        let (metadata, status) = match validate_cache(&store, &stamp, partition_size) {
            Some(metadata) => (metadata, CacheStatus::Reused),
            None => {
                let (metadata, stats) = indexer::rebuild(source, &store, partition_size, stamp, cancel)?;
                (metadata, CacheStatus::Rebuilt(stats))
            }
        };

        let index = Self {
            source: source.to_path_buf(),
            store,
            metadata,
            partition_size,
            encoding,
            cancel: cancel.clone(),
        };
        Ok((index, status))
    }

    pub fn metadata(&self) -> &CacheMetadata {
        &self.metadata
    }

    pub fn partition_size(&self) -> PartitionSize {
        self.partition_size
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Read zero-based line `line`, without its terminator
    ///
    /// A partition record that is missing or malformed even though the
    /// metadata accounts for it triggers one full rebuild before giving up.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfRange`] if the line is past the end of the file
    /// - [`Error::CorruptIndex`] if the partition is still unusable after a rebuild
    /// - [`Error::Io`] if the source cannot be read
    pub fn read_line(&mut self, line: u64) -> Result<String> {
        let location = self.partition_size.locate(line);
        location.check_partition(&self.metadata)?;

        let partition = match self.load_partition(location.partition) {
            Some(partition) => partition,
            None => {
                warn!("Partition {} is missing or malformed, rebuilding index cache", location.partition);
                self.rebuild()?;
                location.check_partition(&self.metadata)?;
                self.load_partition(location.partition).ok_or_else(|| {
                    Error::CorruptIndex(format!(
                        "partition {} unusable after rebuild",
                        self.store.partition_path(location.partition).display()
                    ))
                })?
            }
        };

        let index = location.check_index(&partition)?;
        let range = LineRange::within(&partition, index).ok_or(Error::OutOfRange { line })?;
        read_range(&self.source, range, self.encoding, &self.cancel)
    }

    fn load_partition(&self, index: u64) -> Option<Partition> {
        debug!("Reading from partition file: {}", self.store.partition_path(index).display());

        let partition = self.store.load_partition(index, self.partition_size.get())?;
        // Only the final partition may be partially filled
        let is_last = index + 1 == self.metadata.partition_count;
        if !is_last && partition.len() as u64 != self.partition_size.get() {
            debug!("Partition {} is short but not the last one", index);
            return None;
        }
        Some(partition)
    }

    fn rebuild(&mut self) -> Result<IndexStats> {
        let stamp = SourceStamp::from_path(&self.source)?;
        let (metadata, stats) = indexer::rebuild(&self.source, &self.store, self.partition_size, stamp, &self.cancel)?;
        self.metadata = metadata;
        Ok(stats)
    }
}
