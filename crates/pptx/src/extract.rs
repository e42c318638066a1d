//! Archive extraction.
//!
//! Unpacks every entry of a ZIP package into a directory. The function
//! returns only after each file has been written and synced, so callers can
//! read parts immediately.

use deck_core::{Error, Result};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use zip::ZipArchive;

/// Extract `source` into `dest`, returning the number of files written.
pub fn extract_archive(source: &Path, dest: &Path) -> Result<usize> {
    let file = File::open(source).map_err(|e| {
        Error::ExtractionError(format!("Failed to open template '{}': {}", source.display(), e))
    })?;

    let mut archive = ZipArchive::new(file)
        .map_err(|e| Error::ExtractionError(format!("Failed to open ZIP: {}", e)))?;

    fs::create_dir_all(dest).map_err(|e| {
        Error::ExtractionError(format!("Failed to create '{}': {}", dest.display(), e))
    })?;

    let mut written = 0;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| Error::ExtractionError(format!("Failed to read entry {}: {}", index, e)))?;

        // Reject absolute paths and `..` components.
        let relative = entry.enclosed_name().map(Path::to_path_buf).ok_or_else(|| {
            Error::ExtractionError(format!("Entry escapes extraction root: {}", entry.name()))
        })?;
        let target = dest.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| io_failure(&target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| io_failure(parent, e))?;
        }

        let mut out = File::create(&target).map_err(|e| io_failure(&target, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| io_failure(&target, e))?;
        out.sync_all().map_err(|e| io_failure(&target, e))?;
        written += 1;
    }

    log::debug!("Extracted {} files into {}", written, dest.display());
    Ok(written)
}

fn io_failure(path: &Path, e: io::Error) -> Error {
    Error::ExtractionError(format!("Failed to write '{}': {}", path.display(), e))
}
