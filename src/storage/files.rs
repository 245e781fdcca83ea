use crate::{HarvestError, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// A document present in the destination directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    pub name: String,
    pub modified: DateTime<Local>,
    pub size: u64,
}

/// Creates the directory (and parents) if it does not exist
///
/// # Returns
///
/// * `Ok(true)` - The directory was created
/// * `Ok(false)` - The directory already existed
pub fn ensure_dir(path: &Path) -> io::Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path)?;
    Ok(true)
}

/// Lists the regular files in a destination directory, newest first
///
/// A directory that does not exist yet holds no files and yields an empty list.
/// Ties in modification time are broken by name so the order is stable.
pub fn list_downloaded_files(dir: &Path) -> Result<Vec<StoredFile>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }

        files.push(StoredFile {
            name: entry.file_name().to_string_lossy().into_owned(),
            modified: DateTime::<Local>::from(metadata.modified()?),
            size: metadata.len(),
        });
    }

    files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
    Ok(files)
}

/// Counts regular files in a directory; unreadable directories count as empty
pub fn count_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
                .count()
        })
        .unwrap_or(0)
}

/// Resolves a bare file name inside the directory
///
/// # Errors
///
/// * `HarvestError::InvalidFileName` - The name is empty, contains a path separator or is `.`/`..`
/// * `HarvestError::NotFound` - No regular file of that name exists
pub fn resolve_file(dir: &Path, name: &str) -> Result<PathBuf> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(HarvestError::InvalidFileName(name.to_string()));
    }

    let path = dir.join(name);
    if !path.is_file() {
        return Err(HarvestError::NotFound(name.to_string()));
    }
    Ok(path)
}

/// Opens a downloaded file for streaming back to a caller
pub fn open_file(dir: &Path, name: &str) -> Result<File> {
    let path = resolve_file(dir, name)?;
    Ok(File::open(path)?)
}
