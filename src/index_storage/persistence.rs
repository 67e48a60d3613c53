//! Cache persistence: directory layout, record loading and writing

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::metadata::CacheMetadata;
use super::partition::Partition;
use crate::error::{Error, IoContext, Result};
use crate::utils::file_base_name;

pub const CACHE_DIRNAME: &str = ".cache";
const METADATA_FILENAME: &str = "metadata.json";
const PARTITIONS_DIRNAME: &str = "partitions";

/// On-disk index records for exactly one source file
///
/// Layout, rooted at `<cache_root>/.cache/<basename>/`:
///
/// ```text
/// metadata.json           {"mtime","size","partitionCount","partitionSize"}
/// partitions/p-<i>.json   [byteOffset, [cumulativeLen_0, ...]]
/// ```
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    /// Cache store for `source`, namespaced by its base name under `cache_root`
    pub fn new(cache_root: &Path, source: &Path) -> Result<Self> {
        let base_name = file_base_name(source)?;
        Ok(Self { dir: cache_root.join(CACHE_DIRNAME).join(base_name) })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILENAME)
    }

    pub fn partitions_dir(&self) -> PathBuf {
        self.dir.join(PARTITIONS_DIRNAME)
    }

    pub fn partition_path(&self, index: u64) -> PathBuf {
        self.partitions_dir().join(format!("p-{}.json", index))
    }

    /// Create the cache directories if missing
    ///
    /// # Errors
    ///
    /// Fails if the cache path exists but is not a directory, or cannot be created.
    pub fn ensure_dirs(&self) -> Result<()> {
        match fs::metadata(&self.dir) {
            Ok(meta) if meta.is_dir() => return Ok(()),
            Ok(_) => {
                return Err(Error::io(
                    format!("Cache folder is not a directory: {}", self.dir.display()),
                    std::io::Error::from(ErrorKind::AlreadyExists),
                ));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Cache folder does not exist, creating {}", self.dir.display());
            }
            Err(e) => {
                return Err(Error::io(format!("Cache folder cannot be accessed: {}", self.dir.display()), e));
            }
        }

        let partitions = self.partitions_dir();
        fs::create_dir_all(&partitions)
            .io_context(|| format!("Cache partitions folder cannot be created: {}", partitions.display()))
    }

    /// Delete everything cached for this source and recreate an empty partitions folder
    pub fn reset(&self) -> Result<()> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(format!("Cache folder cannot be cleared: {}", self.dir.display()), e)),
        }

        let partitions = self.partitions_dir();
        fs::create_dir_all(&partitions)
            .io_context(|| format!("Cache partitions folder cannot be created: {}", partitions.display()))
    }

    /// Load metadata; `None` if it is absent, unreadable or malformed
    pub fn load_metadata(&self) -> Option<CacheMetadata> {
        let metadata: CacheMetadata = load_record(&self.metadata_path())?;
        if !metadata.is_well_formed() {
            debug!("Ignoring malformed cache metadata at {}", self.metadata_path().display());
            return None;
        }
        Some(metadata)
    }

    /// Write metadata atomically (temp file + rename)
    pub fn save_metadata(&self, metadata: &CacheMetadata) -> Result<()> {
        let metadata_path = self.metadata_path();
        let metadata_temp = self.dir.join(format!("{}.tmp", METADATA_FILENAME));

        write_record(&metadata_temp, metadata)?;
        fs::rename(&metadata_temp, &metadata_path)
            .io_context(|| format!("Metadata cache file cannot be written: {}", metadata_path.display()))
    }

    /// Load partition `index`; `None` if it is absent, unreadable, malformed
    /// or holds more than `max_lines` entries
    pub fn load_partition(&self, index: u64, max_lines: u64) -> Option<Partition> {
        let path = self.partition_path(index);
        let partition: Partition = load_record(&path)?;
        if !partition.is_well_formed(max_lines) {
            debug!("Ignoring malformed partition record at {}", path.display());
            return None;
        }
        Some(partition)
    }

    pub fn write_partition(&self, index: u64, partition: &Partition) -> Result<()> {
        write_record(&self.partition_path(index), partition)
    }
}

fn load_record<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            debug!("Cache record {} unavailable: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_slice(&data) {
        Ok(record) => Some(record),
        Err(e) => {
            debug!("Cache record {} cannot be parsed: {}", path.display(), e);
            None
        }
    }
}

fn write_record<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let file = File::create(path).io_context(|| format!("Cache file cannot be created: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, record)
        .map_err(|e| Error::Json { context: format!("Cache file cannot be written: {}", path.display()), source: e })?;
    writer.flush().io_context(|| format!("Cache file cannot be written: {}", path.display()))
}
