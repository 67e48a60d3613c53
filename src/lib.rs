//! partline - random access to lines of large text files
//!
//! Builds a partitioned index of line byte offsets once, persists it under
//! `.cache/<basename>/`, and reuses it for as long as the source file's
//! modification time, size and the configured partition size stay the same.
//!
//! - Partitions hold a power-of-two number of lines, so a line number is split
//!   into partition and in-partition index with a shift and a mask
//! - A lookup loads the metadata record and one partition record, then reads
//!   only the requested line's bytes from the source
//! - A stale or damaged cache is deleted and rebuilt in one streaming pass
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use partline::{CancelToken, Encoding, LineIndex, PartitionSize};
//!
//! let (mut index, _status) = LineIndex::open(
//!     Path::new("big.log"),
//!     Path::new("."),
//!     PartitionSize::new(1024)?,
//!     Encoding::Utf8,
//!     &CancelToken::new(),
//! )?;
//! println!("{}", index.read_line(123_456)?);
//! # Ok::<(), partline::Error>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod index_storage;
pub mod indexer;
pub mod reader;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, Encoding, PartitionSize};
pub use error::{Error, Result};
pub use index_storage::{CacheMetadata, CacheStore, Partition, SourceStamp};
pub use indexer::{IndexStats, LineLocation, build_index};
pub use reader::{CacheStatus, LineIndex};
pub use utils::{CancelToken, resolve_path};
