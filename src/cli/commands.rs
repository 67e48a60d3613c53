use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{Config, Encoding, PartitionSize};
use crate::error::{Error, IoContext, Result};
use crate::generator::{GenerateOptions, GenerateStats, generate_file};
use crate::reader::{CacheStatus, LineIndex};
use crate::utils::{CancelToken, validate_new_file, validate_readable_file};

/// `read-line <file-path> <line-number>`
#[derive(Debug)]
pub struct ReadLineCommand {
    cwd: PathBuf,
    encoding: Encoding,
    partition_size: PartitionSize,
    cancel: CancelToken,
}

impl ReadLineCommand {
    pub const ACTION: &'static str = "read-line";

    /// Validates the partition size and encoding before any file is touched
    pub fn new(config: &Config, cwd: &Path, cancel: &CancelToken) -> Result<Self> {
        Ok(Self {
            cwd: cwd.to_path_buf(),
            encoding: config.encoding()?,
            partition_size: config.partition_size()?,
            cancel: cancel.clone(),
        })
    }

    /// Resolve line `line_input` of `file_input` and write it to `out`
    ///
    /// The index lives under `<cwd>/.cache/<basename>/`.
    pub fn execute<W: Write>(&self, file_input: &str, line_input: &str, out: &mut W) -> Result<()> {
        let source = validate_readable_file(&self.cwd, file_input)?;
        let line = parse_line_number(line_input)?;

        let (mut index, status) =
            LineIndex::open(&source, &self.cwd, self.partition_size, self.encoding, &self.cancel)?;
        if let CacheStatus::Rebuilt(stats) = status {
            info!("Index cache rebuilt: {} lines, {} partitions", stats.lines, stats.partitions_written);
        }

        let text = index.read_line(line)?;
        writeln!(out, "{}", text).io_context(|| "Failed to write line to output")?;
        Ok(())
    }
}

/// `generate-file <file-name> <number-of-lines>`
#[derive(Debug)]
pub struct GenerateFileCommand {
    cwd: PathBuf,
    line_min: usize,
    line_max: usize,
    cancel: CancelToken,
}

impl GenerateFileCommand {
    pub const ACTION: &'static str = "generate-file";

    /// Only the line length bounds are read; read-line settings are ignored
    pub fn new(config: &Config, cwd: &Path, cancel: &CancelToken) -> Result<Self> {
        Ok(Self {
            cwd: cwd.to_path_buf(),
            line_min: config.line_min_length()?,
            line_max: config.line_max_length()?,
            cancel: cancel.clone(),
        })
    }

    pub fn execute(&self, file_input: &str, lines_input: &str) -> Result<GenerateStats> {
        let path = validate_new_file(&self.cwd, file_input)?;
        let lines = parse_line_count(lines_input)?;

        let options = GenerateOptions { lines, line_min: self.line_min, line_max: self.line_max };
        generate_file(&path, options, &self.cancel)
    }
}

/// Parse a zero-based line number
pub fn parse_line_number(input: &str) -> Result<u64> {
    match input.trim().parse::<i128>() {
        Ok(n) if n < 0 => Err(Error::Validation("Line number must be greater than or equal to 0".to_string())),
        Ok(n) => u64::try_from(n).map_err(|_| Error::Validation(format!("Line number is too large: {}", input))),
        Err(_) => Err(Error::Validation(format!("Line number must be a number: {}", input))),
    }
}

/// Parse the number of lines to generate
pub fn parse_line_count(input: &str) -> Result<u64> {
    match input.trim().parse::<i128>() {
        Ok(n) if n < 1 => Err(Error::Validation("Number of lines must be greater than 0".to_string())),
        Ok(n) => u64::try_from(n).map_err(|_| Error::Validation(format!("Number of lines is too large: {}", input))),
        Err(_) => Err(Error::Validation(format!("Number of lines must be a number: {}", input))),
    }
}
