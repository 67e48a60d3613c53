//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use partline::{CacheStatus, CancelToken, Encoding, LineIndex, PartitionSize};
use tempfile::TempDir;

/// Builder for a working directory holding one source file
pub struct SourceFileBuilder {
    temp_dir: TempDir,
    name: String,
    content: Vec<u8>,
}

impl SourceFileBuilder {
    /// Create a new builder for an empty `source.txt`
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir, name: "source.txt".to_string(), content: Vec::new() }
    }

    /// Set the file name
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Set raw file content
    pub fn content(mut self, content: &[u8]) -> Self {
        self.content = content.to_vec();
        self
    }

    /// Set the content to `lines`, each terminated with `\n`
    pub fn lines<S: AsRef<str>>(mut self, lines: &[S]) -> Self {
        self.content.clear();
        for line in lines {
            self.content.extend_from_slice(line.as_ref().as_bytes());
            self.content.push(b'\n');
        }
        self
    }

    /// Write the file and return the fixture
    pub fn build(self) -> SourceFixture {
        let path = self.temp_dir.path().join(&self.name);
        fs::write(&path, &self.content).expect("Failed to write source file");
        SourceFixture { temp_dir: self.temp_dir, path }
    }
}

impl Default for SourceFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A written source file inside its own working directory
pub struct SourceFixture {
    temp_dir: TempDir,
    pub path: PathBuf,
}

impl SourceFixture {
    /// The working directory; the cache lives under `<cwd>/.cache/`
    pub fn cwd(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Open the index with the given partition size
    pub fn open(&self, partition_size: u64) -> (LineIndex, CacheStatus) {
        LineIndex::open(
            &self.path,
            self.cwd(),
            PartitionSize::new(partition_size).expect("partition size must be a power of two"),
            Encoding::Utf8,
            &CancelToken::new(),
        )
        .expect("Failed to open line index")
    }

    /// Shift the source's modification time without touching its content
    pub fn bump_mtime(&self, by: Duration) {
        let file = fs::File::options().write(true).open(&self.path).expect("Failed to open source");
        let current = file.metadata().and_then(|m| m.modified()).expect("Failed to read mtime");
        file.set_modified(current + by).expect("Failed to set mtime");
    }

    /// Overwrite the source content, keeping the original mtime
    pub fn rewrite_keeping_mtime(&self, content: &[u8]) {
        let mtime = fs::metadata(&self.path).and_then(|m| m.modified()).expect("Failed to read mtime");
        fs::write(&self.path, content).expect("Failed to rewrite source");
        let file = fs::File::options().write(true).open(&self.path).expect("Failed to open source");
        file.set_modified(mtime).expect("Failed to set mtime");
    }

    /// Modification time of a cache file, used to detect rewrites
    pub fn cache_file_mtime(&self, relative: &str) -> SystemTime {
        let path = self.cwd().join(".cache").join(self.path.file_name().unwrap()).join(relative);
        fs::metadata(path).and_then(|m| m.modified()).expect("Failed to stat cache file")
    }
}

/// `n` lines of varied length and content, including multi-byte characters
pub fn varied_lines(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| match i % 5 {
            0 => String::new(),
            1 => format!("line {}", i),
            2 => format!("{} 音楽好き {}", i, "x".repeat(i % 17)),
            3 => "-".repeat(i % 41),
            _ => format!("entry #{} with some trailing text", i),
        })
        .collect()
}
