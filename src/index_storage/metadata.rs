//! Cache metadata structures for staleness detection

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::config::PartitionSize;
use crate::error::{Error, IoContext, Result};

/// Modification time and size of a source file at the moment it was checked
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceStamp {
    /// Milliseconds since the Unix epoch, sub-millisecond precision kept
    pub mtime: f64,
    pub size: u64,
}

impl SourceStamp {
    /// Stat the source file
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata =
            fs::metadata(path).io_context(|| format!("Failed to read file metadata: {}", path.display()))?;
        let modified =
            metadata.modified().io_context(|| format!("Failed to read modification time: {}", path.display()))?;

        Ok(Self { mtime: mtime_millis(modified)?, size: metadata.len() })
    }
}

fn mtime_millis(time: SystemTime) -> Result<f64> {
    let since_epoch = time
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_err(|e| Error::Validation(format!("Modification time predates the Unix epoch: {}", e)))?;
    Ok(since_epoch.as_nanos() as f64 / 1_000_000.0)
}

/// The per-source descriptor stored as `metadata.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CacheMetadata {
    pub mtime: f64,
    pub size: u64,
    pub partition_count: u64,
    pub partition_size: u64,
}

impl CacheMetadata {
    pub fn new(stamp: SourceStamp, partition_size: PartitionSize, partition_count: u64) -> Self {
        Self { mtime: stamp.mtime, size: stamp.size, partition_count, partition_size: partition_size.get() }
    }

    /// Shape checks that serde cannot express
    pub fn is_well_formed(&self) -> bool {
        self.mtime.is_finite() && self.partition_size.is_power_of_two()
    }

    /// Check whether this record still describes `stamp` under `partition_size`
    ///
    /// All comparisons are exact, including the floating point mtime.
    pub fn matches(&self, stamp: &SourceStamp, partition_size: PartitionSize) -> bool {
        self.is_well_formed()
            && self.mtime == stamp.mtime
            && self.size == stamp.size
            && self.partition_size == partition_size.get()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::NamedTempFile;

    use super::*;

    fn size(n: u64) -> PartitionSize {
        PartitionSize::new(n).unwrap()
    }

    #[test]
    fn test_stamp_from_path() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "hello\n").unwrap();

        let stamp = SourceStamp::from_path(file.path()).unwrap();
        assert_eq!(stamp.size, 6);
        assert!(stamp.mtime > 0.0);
    }

    #[test]
    fn test_stamp_missing_file() {
        let err = SourceStamp::from_path(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_mtime_keeps_sub_millisecond_precision() {
        let time = SystemTime::UNIX_EPOCH + Duration::from_nanos(1_700_000_000_123_456_789);
        assert_eq!(mtime_millis(time).unwrap(), 1_700_000_000_123_456_789u128 as f64 / 1_000_000.0);
    }

    #[test]
    fn test_matches_exact_triple() {
        let stamp = SourceStamp { mtime: 1_700_000_000_123.456, size: 42 };
        let metadata = CacheMetadata::new(stamp, size(4), 3);

        assert!(metadata.matches(&stamp, size(4)));
        assert!(!metadata.matches(&SourceStamp { mtime: 1_700_000_000_123.457, ..stamp }, size(4)));
        assert!(!metadata.matches(&SourceStamp { size: 43, ..stamp }, size(4)));
        assert!(!metadata.matches(&stamp, size(8)));
    }

    #[test]
    fn test_json_field_names() {
        let metadata = CacheMetadata { mtime: 1.5, size: 10, partition_count: 2, partition_size: 4 };
        let json = serde_json::to_string(&metadata).unwrap();
        assert_eq!(json, r#"{"mtime":1.5,"size":10,"partitionCount":2,"partitionSize":4}"#);
    }

    #[test]
    fn test_json_roundtrip_is_bit_exact() {
        let metadata =
            CacheMetadata { mtime: 1_712_345_678_901.234_5, size: 1, partition_count: 1, partition_size: 1 };
        let json = serde_json::to_string(&metadata).unwrap();
        let back: CacheMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.mtime.to_bits(), metadata.mtime.to_bits());
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(serde_json::from_str::<CacheMetadata>(r#"{"mtime":1,"size":1}"#).is_err());
        assert!(serde_json::from_str::<CacheMetadata>(r#"{"mtime":"x","size":1,"partitionCount":1,"partitionSize":2}"#).is_err());
        assert!(
            serde_json::from_str::<CacheMetadata>(r#"{"mtime":1,"size":-1,"partitionCount":1,"partitionSize":2}"#)
                .is_err()
        );

        let odd = CacheMetadata { mtime: 1.0, size: 1, partition_count: 1, partition_size: 3 };
        assert!(!odd.is_well_formed());
    }
}
