//! Streaming index builder
//!
//! One forward pass over the source file. Only the partition currently being
//! filled is held in memory, so memory use is bounded by the partition size
//! rather than by the file size.
//!
//! Line lengths are measured on raw bytes: every supported encoding uses the
//! single byte `\n` as terminator. Each line is counted with its terminator,
//! so a `\r\n` line includes the `\r` (stripped again when the line is read)
//! and a final line lacking `\n` is counted as if it had one.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::config::PartitionSize;
use crate::error::{IoContext, Result};
use crate::index_storage::{CacheMetadata, CacheStore, Partition, SourceStamp};
use crate::utils::CancelToken;

/// Read buffer used when streaming the source file
pub const READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Summary of one index build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexStats {
    pub lines: u64,
    pub partitions_written: u64,
    /// Bytes covered by the index, counting an implied final terminator
    pub bytes: u64,
}

/// Accumulates cumulative line lengths and emits a partition every
/// `partition_size` lines
#[derive(Debug)]
pub struct PartitionAccumulator {
    partition_size: PartitionSize,
    /// Bytes consumed by partitions already emitted
    byte_offset: u64,
    line_map: Vec<u64>,
    part_byte_length: u64,
    next_index: u64,
}

impl PartitionAccumulator {
    pub fn new(partition_size: PartitionSize) -> Self {
        Self { partition_size, byte_offset: 0, line_map: Vec::new(), part_byte_length: 0, next_index: 0 }
    }

    /// Record one line of `counted_len` bytes (terminator included)
    ///
    /// Returns the completed partition and its index once it holds
    /// `partition_size` lines.
    pub fn push_line(&mut self, counted_len: u64) -> Option<(u64, Partition)> {
        self.part_byte_length += counted_len;
        self.line_map.push(self.part_byte_length);

        if (self.line_map.len() as u64) < self.partition_size.get() {
            return None;
        }
        Some(self.take_partition())
    }

    /// Emit the trailing partial partition, if it holds any lines
    ///
    /// When the line count is an exact multiple of the partition size there is
    /// nothing left and no empty partition is produced.
    pub fn finish(&mut self) -> Option<(u64, Partition)> {
        if self.line_map.is_empty() {
            return None;
        }
        Some(self.take_partition())
    }

    /// Number of partitions emitted so far
    pub fn partitions_emitted(&self) -> u64 {
        self.next_index
    }

    fn take_partition(&mut self) -> (u64, Partition) {
        let line_map = std::mem::take(&mut self.line_map);
        let partition = Partition::new(self.byte_offset, line_map);
        let index = self.next_index;

        self.byte_offset += self.part_byte_length;
        self.part_byte_length = 0;
        self.next_index += 1;

        (index, partition)
    }
}

/// Build the index of `source` into `store`
///
/// Expects an empty partitions folder (see [`CacheStore::reset`]). Partitions
/// are written in ascending order and the metadata record strictly last, so a
/// build that fails or is cancelled midway leaves no metadata behind.
///
/// # Errors
///
/// Returns an I/O error if the source cannot be read or a record cannot be
/// written, and [`crate::Error::Cancelled`] if `cancel` fires.
pub fn build_index(
    source: &Path,
    store: &CacheStore,
    partition_size: PartitionSize,
    stamp: SourceStamp,
    cancel: &CancelToken,
) -> Result<(CacheMetadata, IndexStats)> {
    info!("Rebuilding index cache for {}", source.display());

    let file = File::open(source).io_context(|| format!("Failed to open source file: {}", source.display()))?;
    let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

    let mut accumulator = PartitionAccumulator::new(partition_size);
    let mut stats = IndexStats::default();
    let mut line = Vec::with_capacity(1024);

    loop {
        cancel.check()?;

        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .io_context(|| format!("Failed to read source file: {}", source.display()))?;
        if read == 0 {
            break;
        }

        let counted = if line.last() == Some(&b'\n') { read as u64 } else { read as u64 + 1 };
        stats.lines += 1;
        stats.bytes += counted;

        if let Some((index, partition)) = accumulator.push_line(counted) {
            store.write_partition(index, &partition)?;
        }
    }

    if let Some((index, partition)) = accumulator.finish() {
        store.write_partition(index, &partition)?;
    }
    stats.partitions_written = accumulator.partitions_emitted();

    cancel.check()?;
    let metadata = CacheMetadata::new(stamp, partition_size, stats.partitions_written);
    store.save_metadata(&metadata)?;

    debug!("Wrote metadata to {}", store.metadata_path().display());
    info!(
        "Indexed {} lines into {} partitions of up to {} lines",
        stats.lines, stats.partitions_written, partition_size
    );

    Ok((metadata, stats))
}
