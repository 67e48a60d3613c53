//! Random test-file generator
//!
//! Writes `N` lines of random hexadecimal content. Each line draws a length
//! `len` from `[line_min, line_max)`, hex-encodes `len` random bytes and cuts
//! the result to at most `line_max` characters.
//!
//! Output goes through a bounded [`BufWriter`]: once its high-water mark is
//! reached the producer blocks until the buffer has been flushed to disk, so
//! memory use stays flat however many lines are requested.

use std::fs::OpenOptions;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

use rand::Rng;
use tracing::info;

use crate::error::{Error, IoContext, Result};
use crate::utils::CancelToken;

/// Write buffer high-water mark
pub const WRITE_BUFFER_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOptions {
    pub lines: u64,
    pub line_min: usize,
    pub line_max: usize,
}

impl GenerateOptions {
    pub fn validate(&self) -> Result<()> {
        if self.lines < 1 {
            return Err(Error::Validation("Number of lines must be greater than 0".to_string()));
        }
        if self.line_min >= self.line_max {
            return Err(Error::Validation(format!(
                "Line min length ({}) must be less than line max length ({})",
                self.line_min, self.line_max
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenerateStats {
    pub lines: u64,
    pub bytes: u64,
}

/// Create `path` and fill it with random lines
///
/// # Errors
///
/// Fails with [`Error::Validation`] if `options` are invalid or `path` already
/// exists (it is never overwritten), with an I/O error on write failure, and
/// with [`Error::Cancelled`] if `cancel` fires.
pub fn generate_file(path: &Path, options: GenerateOptions, cancel: &CancelToken) -> Result<GenerateStats> {
    options.validate()?;

    let file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(Error::Validation(format!("File already exists: {}", path.display())));
        }
        Err(e) => return Err(Error::io(format!("Failed to create file: {}", path.display()), e)),
    };

    info!("Generating file {} with {} lines", path.display(), options.lines);

    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
    let stats = write_random_lines(&mut writer, &mut rand::thread_rng(), options, cancel)?;
    writer.flush().io_context(|| format!("Failed to write file: {}", path.display()))?;

    info!("File {} has been created ({} bytes)", path.display(), stats.bytes);
    Ok(stats)
}

/// Write `options.lines` random lines into `writer`
pub fn write_random_lines<W: Write, R: Rng>(
    writer: &mut W,
    rng: &mut R,
    options: GenerateOptions,
    cancel: &CancelToken,
) -> Result<GenerateStats> {
    let mut stats = GenerateStats::default();
    let mut raw = Vec::with_capacity(options.line_max);

    for _ in 0..options.lines {
        cancel.check()?;

        let line = random_line(rng, &mut raw, options.line_min, options.line_max);
        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.write_all(b"\n"))
            .io_context(|| "Failed to write generated line")?;

        stats.lines += 1;
        stats.bytes += line.len() as u64 + 1;
    }

    Ok(stats)
}

fn random_line<R: Rng>(rng: &mut R, raw: &mut Vec<u8>, line_min: usize, line_max: usize) -> String {
    let len = rng.gen_range(line_min..line_max);
    raw.clear();
    raw.resize(len, 0);
    rng.fill(raw.as_mut_slice());

    let mut line = hex::encode(raw.as_slice());
    line.truncate(line_max);
    line
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::{fs, io, thread};

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tempfile::TempDir;

    use super::*;

    fn options(lines: u64, line_min: usize, line_max: usize) -> GenerateOptions {
        GenerateOptions { lines, line_min, line_max }
    }

    #[test]
    fn test_validate() {
        assert!(options(1, 5, 999).validate().is_ok());
        assert!(options(0, 5, 999).validate().is_err());
        assert!(options(10, 9, 9).validate().is_err());
        assert!(options(10, 10, 9).validate().is_err());
    }

    #[test]
    fn test_line_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut out = Vec::new();
        let stats = write_random_lines(&mut out, &mut rng, options(200, 5, 12), &CancelToken::new()).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 200);
        assert_eq!(stats.lines, 200);
        assert_eq!(stats.bytes, text.len() as u64);

        for line in lines {
            assert!(line.len() >= 10 && line.len() <= 12, "unexpected length {}", line.len());
            assert!(line.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_cancelled_before_first_line() {
        let cancel = CancelToken::new();
        cancel.cancel();

        let mut out = Vec::new();
        let result = write_random_lines(&mut out, &mut StdRng::seed_from_u64(1), options(5, 1, 2), &cancel);
        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(out.is_empty());
    }

    /// Writer that parks on its first write until another thread releases it
    struct GateWriter {
        written: Vec<u8>,
        started: Option<mpsc::Sender<()>>,
        resume: mpsc::Receiver<()>,
    }

    impl Write for GateWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if let Some(started) = self.started.take() {
                started.send(()).unwrap();
                self.resume.recv().unwrap();
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_cancelled_from_another_thread_mid_run() {
        let cancel = CancelToken::new();
        let (started_tx, started_rx) = mpsc::channel();
        let (resume_tx, resume_rx) = mpsc::channel();

        let canceller = {
            let cancel = cancel.clone();
            thread::spawn(move || {
                started_rx.recv().unwrap();
                cancel.cancel();
                resume_tx.send(()).unwrap();
            })
        };

        let mut writer = GateWriter { written: Vec::new(), started: Some(started_tx), resume: resume_rx };
        let result = write_random_lines(&mut writer, &mut StdRng::seed_from_u64(3), options(1000, 5, 12), &cancel);
        canceller.join().unwrap();

        assert!(matches!(result, Err(Error::Cancelled)));
        // The line in flight is finished, nothing after it is written
        assert_eq!(writer.written.iter().filter(|&&b| b == b'\n').count(), 1);
    }

    #[test]
    fn test_generate_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("random.txt");

        let stats = generate_file(&path, options(10, 5, 999), &CancelToken::new()).unwrap();
        assert_eq!(stats.lines, 10);
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 10);
        assert_eq!(fs::metadata(&path).unwrap().len(), stats.bytes);
    }

    #[test]
    fn test_generate_file_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("existing.txt");
        fs::write(&path, "keep me\n").unwrap();

        let err = generate_file(&path, options(10, 5, 999), &CancelToken::new()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me\n");
    }

    #[test]
    fn test_generate_file_rejects_zero_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.txt");

        assert!(generate_file(&path, options(0, 5, 999), &CancelToken::new()).is_err());
        assert!(!path.exists());
    }
}
