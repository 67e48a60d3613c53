//! Process configuration resolved once from the environment
//!
//! Recognised variables:
//!
//! - `FILE_ENCODING`: codec used to decode source lines (default `utf-8`)
//! - `MAX_PARTITION_SIZE`: lines per index partition, a power of two; only
//!   `read-line` requires it
//! - `LINE_MIN_LENGTH` / `LINE_MAX_LENGTH`: generator line bounds (default 5 / 999)
//!
//! An empty variable counts as unset. Values are kept raw and parsed only by
//! the command that needs them, so `generate-file` never trips over a bad
//! `MAX_PARTITION_SIZE` and `read-line` ignores the generator bounds.

pub mod encoding;
pub mod partition_size;

use std::env;
use std::str::FromStr;

pub use encoding::Encoding;
pub use partition_size::PartitionSize;

use crate::error::{Error, Result};

pub const FILE_ENCODING_VAR: &str = "FILE_ENCODING";
pub const MAX_PARTITION_SIZE_VAR: &str = "MAX_PARTITION_SIZE";
pub const LINE_MIN_LENGTH_VAR: &str = "LINE_MIN_LENGTH";
pub const LINE_MAX_LENGTH_VAR: &str = "LINE_MAX_LENGTH";

pub const DEFAULT_LINE_MIN_LENGTH: usize = 5;
pub const DEFAULT_LINE_MAX_LENGTH: usize = 999;

/// Raw configuration values, each validated by the accessor of the command that uses it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    pub file_encoding: Option<String>,
    pub max_partition_size: Option<String>,
    pub line_min_length: Option<String>,
    pub line_max_length: Option<String>,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            file_encoding: get(FILE_ENCODING_VAR),
            max_partition_size: get(MAX_PARTITION_SIZE_VAR),
            line_min_length: get(LINE_MIN_LENGTH_VAR),
            line_max_length: get(LINE_MAX_LENGTH_VAR),
        }
    }

    /// Codec for source reads, `utf-8` when unset
    pub fn encoding(&self) -> Result<Encoding> {
        match &self.file_encoding {
            Some(label) => label.parse(),
            None => Ok(Encoding::default()),
        }
    }

    /// The validated partition size
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `MAX_PARTITION_SIZE` is unset, not a number
    /// or not a power of two.
    pub fn partition_size(&self) -> Result<PartitionSize> {
        let raw = self
            .max_partition_size
            .as_deref()
            .ok_or_else(|| Error::Config("Max partition size is required".to_string()))?;
        PartitionSize::new(parse_var(MAX_PARTITION_SIZE_VAR, raw)?)
    }

    pub fn line_min_length(&self) -> Result<usize> {
        parse_or(LINE_MIN_LENGTH_VAR, self.line_min_length.as_deref(), DEFAULT_LINE_MIN_LENGTH)
    }

    pub fn line_max_length(&self) -> Result<usize> {
        parse_or(LINE_MAX_LENGTH_VAR, self.line_max_length.as_deref(), DEFAULT_LINE_MAX_LENGTH)
    }
}

fn parse_or<T: FromStr>(key: &str, value: Option<&str>, default: T) -> Result<T> {
    value.map_or(Ok(default), |v| parse_var(key, v))
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| Error::Config(format!("{} has an invalid value: {}", key, value)))
}
