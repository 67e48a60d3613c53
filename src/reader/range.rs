use std::fs::File;
use std::io::{self, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use crate::config::Encoding;
use crate::error::{Error, IoContext, Result};
use crate::index_storage::Partition;
use crate::utils::CancelToken;

/// Largest chunk requested from the source in one read call
pub const READ_CHUNK_SIZE: usize = 1024 * 1024;

/// Byte range `[start, end)` of one line, terminator excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: u64,
    pub end: u64,
}

impl LineRange {
    /// Range of line `index` of `partition`, derived from consecutive line map entries
    pub fn within(partition: &Partition, index: usize) -> Option<Self> {
        let cumulative = *partition.line_map.get(index)?;
        let preceding = if index > 0 { partition.line_map[index - 1] } else { 0 };

        Some(Self { start: partition.byte_offset + preceding, end: partition.byte_offset + cumulative - 1 })
    }

    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read exactly the bytes of `range` from `source` and decode them
///
/// Only `range` is requested from the file, independent of file size. A
/// single trailing `\r` is dropped so `\r\n` lines read like `\n` lines.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read or ends before `range.end`,
/// and [`Error::Cancelled`] if `cancel` fires between chunks.
pub fn read_range(source: &Path, range: LineRange, encoding: Encoding, cancel: &CancelToken) -> Result<String> {
    cancel.check()?;

    let mut file = File::open(source).io_context(|| format!("Failed to open source file: {}", source.display()))?;
    file.seek(SeekFrom::Start(range.start))
        .io_context(|| format!("Failed to seek in source file: {}", source.display()))?;

    let expected = range.len();
    let mut bytes = Vec::with_capacity(expected.min(READ_CHUNK_SIZE as u64) as usize);
    let mut limited = file.take(expected);
    let mut chunk = vec![0u8; expected.clamp(1, READ_CHUNK_SIZE as u64) as usize];

    loop {
        cancel.check()?;
        let n = match limited.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::io(format!("Read stream error: {}", source.display()), e)),
        };
        bytes.extend_from_slice(&chunk[..n]);
    }

    if (bytes.len() as u64) < expected {
        return Err(Error::io(
            format!("Source file is shorter than its index: {}", source.display()),
            io::Error::from(ErrorKind::UnexpectedEof),
        ));
    }

    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }

    Ok(encoding.decode(&bytes).into_owned())
}
