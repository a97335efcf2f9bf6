//! Filesystem staging helpers for build working directories.

use std::path::Path;

use crate::error::{BatonError, Result};

/// Recursively copies the contents of `src` into `dst`.
///
/// Regular files and directories are copied; symbolic links are skipped
/// entirely (neither followed nor recreated). `dst` and any missing
/// parents are created.
///
/// # Errors
///
/// Returns an error if `src` cannot be read or an entry cannot be copied.
pub fn stage(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst).map_err(|e| io_err(dst, e))?;

    let entries = std::fs::read_dir(src).map_err(|e| io_err(src, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(src, e))?;
        let file_type = entry.file_type().map_err(|e| io_err(&entry.path(), e))?;
        let target = dst.join(entry.file_name());

        if file_type.is_dir() {
            stage(&entry.path(), &target)?;
        } else if file_type.is_file() {
            let _ = std::fs::copy(entry.path(), &target).map_err(|e| io_err(&entry.path(), e))?;
        }
    }
    Ok(())
}

/// Removes `dir` if it exists and recreates it empty.
///
/// # Errors
///
/// Returns an error if removal or creation fails for any reason other
/// than the directory not existing beforehand.
pub fn clean_dir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(io_err(dir, e)),
    }
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))
}

fn io_err(path: &Path, source: std::io::Error) -> BatonError {
    BatonError::Io {
        path: path.to_path_buf(),
        source,
    }
}
