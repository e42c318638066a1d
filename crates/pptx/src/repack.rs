//! Archive repacking.

use deck_core::{Error, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Maximum Deflate level; output size over speed.
const COMPRESSION_LEVEL: i32 = 9;

/// Part that OOXML readers expect first in the package.
const CONTENT_TYPES_ENTRY: &str = "[Content_Types].xml";

/// Zip every file under `source` into a new archive at `output`.
///
/// Entries keep their paths relative to `source`. The output must not
/// already exist. If anything fails the partial output is removed.
pub fn repack_dir(source: &Path, output: &Path) -> Result<usize> {
    let mut entries = Vec::new();
    collect_files(source, source, &mut entries)
        .map_err(|e| Error::RepackError(format!("Failed to walk '{}': {}", source.display(), e)))?;

    // Sorted for reproducible output, content types first.
    entries.sort_by(|a, b| {
        (a.0 != CONTENT_TYPES_ENTRY, &a.0).cmp(&(b.0 != CONTENT_TYPES_ENTRY, &b.0))
    });

    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(output)
        .map_err(|e| Error::RepackError(format!("Failed to create '{}': {}", output.display(), e)))?;

    match write_archive(file, &entries) {
        Ok(()) => {
            log::debug!("Packed {} files into {}", entries.len(), output.display());
            Ok(entries.len())
        }
        Err(e) => {
            if let Err(rm) = fs::remove_file(output) {
                log::error!("Failed to remove partial output {}: {}", output.display(), rm);
            }
            Err(e)
        }
    }
}

fn write_archive(file: File, entries: &[(String, PathBuf)]) -> Result<()> {
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL));

    for (name, path) in entries {
        zip.start_file(name.as_str(), options)
            .map_err(|e| Error::RepackError(format!("Failed to start entry '{}': {}", name, e)))?;
        let mut source = File::open(path)
            .map_err(|e| Error::RepackError(format!("Failed to open '{}': {}", path.display(), e)))?;
        io::copy(&mut source, &mut zip)
            .map_err(|e| Error::RepackError(format!("Failed to write entry '{}': {}", name, e)))?;
    }

    let mut file = zip
        .finish()
        .map_err(|e| Error::RepackError(format!("Failed to finalize archive: {}", e)))?;
    file.flush()
        .and_then(|_| file.sync_all())
        .map_err(|e| Error::RepackError(format!("Failed to flush archive: {}", e)))?;

    Ok(())
}

/// Collect `(entry name, absolute path)` for every file under `dir`.
fn collect_files(root: &Path, dir: &Path, out: &mut Vec<(String, PathBuf)>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            collect_files(root, &path, out)?;
        } else if file_type.is_file() {
            let relative = path
                .strip_prefix(root)
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            out.push((name, path));
        }
    }
    Ok(())
}
