use crate::config::PartitionSize;
use crate::error::{Error, Result};
use crate::index_storage::{CacheMetadata, Partition};

/// Position of a line inside the partitioned index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineLocation {
    pub line: u64,
    pub partition: u64,
    /// Line index within the partition
    pub index: u64,
}

impl PartitionSize {
    /// Split a zero-based line number into partition and in-partition index
    #[inline]
    pub fn locate(self, line: u64) -> LineLocation {
        LineLocation { line, partition: line >> self.shift(), index: line & self.mask() }
    }
}

impl LineLocation {
    /// First bounds check: the partition must exist according to the metadata
    pub fn check_partition(&self, metadata: &CacheMetadata) -> Result<()> {
        if self.partition >= metadata.partition_count {
            return Err(Error::OutOfRange { line: self.line });
        }
        Ok(())
    }

    /// Second bounds check: the loaded partition must hold the line. Only the
    /// trailing partial partition can fail here.
    pub fn check_index(&self, partition: &Partition) -> Result<usize> {
        let index = usize::try_from(self.index).map_err(|_| Error::OutOfRange { line: self.line })?;
        if index >= partition.len() {
            return Err(Error::OutOfRange { line: self.line });
        }
        Ok(index)
    }
}
