//! Source file discovery.

use std::path::{Path, PathBuf};

use roundtrip_model::is_markup_file;

use crate::error::{IngestError, Result};

/// Lists every `.xml` file below `dir`, recursing into subdirectories.
///
/// Returns paths prefixed with `dir`, sorted so repeated listings of the same
/// tree come back in the same order.
pub fn list_markup_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = std::fs::read_dir(&current).map_err(|e| IngestError::DirectoryRead {
            path: current.clone(),
            source: e,
        })?;

        for entry_result in entries {
            let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
                path: current.clone(),
                source: e,
            })?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| IngestError::DirectoryRead {
                path: path.clone(),
                source: e,
            })?;

            if file_type.is_dir() {
                pending.push(path);
            } else if is_markup_file(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    tracing::debug!(dir = %dir.display(), file_count = files.len(), "listed source files");
    Ok(files)
}
