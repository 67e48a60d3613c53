use serde::{Deserialize, Serialize};

/// One run of up to `partitionSize` consecutive lines
///
/// Stored on disk as the pair `[byteOffset, lineMap]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u64, Vec<u64>)", into = "(u64, Vec<u64>)")]
pub struct Partition {
    /// Absolute position in the source file where the partition's first line starts
    pub byte_offset: u64,
    /// `line_map[i]` is the byte length of lines `0..=i`, terminators included
    pub line_map: Vec<u64>,
}

impl Partition {
    pub fn new(byte_offset: u64, line_map: Vec<u64>) -> Self {
        Self { byte_offset, line_map }
    }

    /// Number of lines in the partition
    pub fn len(&self) -> usize {
        self.line_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line_map.is_empty()
    }

    /// Total bytes covered by the partition
    pub fn byte_len(&self) -> u64 {
        self.line_map.last().copied().unwrap_or(0)
    }

    /// Checks the invariants a loaded record must satisfy: non-empty, no more
    /// than `max_lines` entries, strictly increasing and starting above zero.
    pub fn is_well_formed(&self, max_lines: u64) -> bool {
        !self.line_map.is_empty()
            && self.line_map.len() as u64 <= max_lines
            && self.line_map[0] > 0
            && self.line_map.windows(2).all(|w| w[0] < w[1])
            && self.byte_offset.checked_add(self.byte_len()).is_some()
    }
}

impl From<(u64, Vec<u64>)> for Partition {
    fn from((byte_offset, line_map): (u64, Vec<u64>)) -> Self {
        Self { byte_offset, line_map }
    }
}

impl From<Partition> for (u64, Vec<u64>) {
    fn from(partition: Partition) -> Self {
        (partition.byte_offset, partition.line_map)
    }
}
