//! Line retrieval through a persisted partition index

pub mod lookup;
pub mod range;

pub use lookup::{CacheStatus, LineIndex};
pub use range::{LineRange, read_range};
