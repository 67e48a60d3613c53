use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Resolves a user-supplied path against the invocation's working directory
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use partline::resolve_path;
///
/// assert_eq!(resolve_path(Path::new("/work"), "data.txt"), PathBuf::from("/work/data.txt"));
/// assert_eq!(resolve_path(Path::new("/work"), "/tmp/data.txt"), PathBuf::from("/tmp/data.txt"));
/// ```
pub fn resolve_path(cwd: &Path, input: &str) -> PathBuf {
    let path = Path::new(input);
    if path.is_absolute() { path.to_path_buf() } else { cwd.join(path) }
}

/// Validates that `input` names an existing, readable regular file
///
/// # Errors
///
/// Returns [`Error::Validation`] if the name is empty, or the file is missing,
/// unreadable or a directory.
pub fn validate_readable_file(cwd: &Path, input: &str) -> Result<PathBuf> {
    if input.is_empty() {
        return Err(Error::Validation("File name must be at least 1 character long".to_string()));
    }

    let path = resolve_path(cwd, input);
    let readable = File::open(&path).and_then(|f| f.metadata()).map(|m| m.is_file()).unwrap_or(false);
    if !readable {
        return Err(Error::Validation(format!("File does not exist or is not readable: {}", input)));
    }

    Ok(path)
}

/// Validates that `input` names a path that does not exist yet
///
/// This is advisory; the generator still opens its output with create-new
/// semantics so a file appearing in between is never overwritten.
pub fn validate_new_file(cwd: &Path, input: &str) -> Result<PathBuf> {
    if input.is_empty() {
        return Err(Error::Validation("File name must be at least 1 character long".to_string()));
    }

    let path = resolve_path(cwd, input);
    // symlink_metadata so that a dangling symlink also counts as existing
    if path.symlink_metadata().is_ok() {
        return Err(Error::Validation(format!("File already exists: {}", input)));
    }

    Ok(path)
}

/// Base name of a source file, used to namespace its cache directory
pub fn file_base_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| Error::Validation(format!("Path has no file name: {}", path.display())))
}
