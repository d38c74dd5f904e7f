//! Atomic file writes.
//!
//! Content is written to a temporary file in the target's directory, synced,
//! and renamed over the target, so a reader never sees a partial file under
//! the final name. Source and destination share a directory, so the rename
//! stays on one filesystem.
//!
//! On crash, a temporary file named `.{filename}.tmp` may remain.

use crate::error::{HermodError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically write bytes to a file, creating parent directories.
///
/// # Returns
///
/// * `Ok(())` - The file is in place with the full content
/// * `Err(HermodError::Persistence)` - On directory creation, write, sync, or rename failure
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            HermodError::Persistence(format!(
                "failed to create directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = generate_temp_path(path)?;
    write_and_sync(&temp_path, content)?;
    replace(&temp_path, path)
}

/// `.{name}.tmp` next to the target, so the rename never crosses filesystems.
fn generate_temp_path(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            HermodError::Persistence(format!("invalid file path '{}'", target.display()))
        })?;

    Ok(parent.join(format!(".{}.tmp", filename)))
}

/// Write and fsync; the partial file is removed on failure.
fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        HermodError::Persistence(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let written = file.write_all(content).and_then(|()| file.sync_all());
    if let Err(e) = written {
        let _ = fs::remove_file(path);
        return Err(HermodError::Persistence(format!(
            "failed to write temporary file '{}': {}",
            path.display(),
            e
        )));
    }

    Ok(())
}

/// Rename the temp file over the target, then sync the directory entry.
fn replace(source: &Path, target: &Path) -> Result<()> {
    fs::rename(source, target).map_err(|e| {
        let _ = fs::remove_file(source);
        HermodError::Persistence(format!(
            "failed to move file into place at '{}': {}",
            target.display(),
            e
        ))
    })?;

    sync_parent_dir(target);
    Ok(())
}

/// Persist the directory entry created by the rename.
#[cfg(unix)]
fn sync_parent_dir(target: &Path) {
    if let Some(parent) = target.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_target: &Path) {}
