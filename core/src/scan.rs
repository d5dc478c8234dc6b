use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ProcessingError;
use crate::format::{SourceFormat, TargetFormat};
use crate::naming::{self, RunTag};

/// One source image slated for conversion, immutable once enumerated.
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Full path to the source file
    pub source: PathBuf,
    /// Source file name, used in progress messages
    pub name: String,
    /// Derived output file name, unique per run
    pub output_name: String,
}

/// Snapshot the source directory into a list of work items.
///
/// Flat, non-recursive, one-shot: files added after this call are not picked
/// up by the running batch. Entries that are not regular files with a known
/// image extension are skipped. Only an unreadable directory is fatal; an
/// entry that errors mid-iteration is skipped with a warning.
pub fn enumerate(
    source_dir: &Path,
    run: &RunTag,
    target: TargetFormat,
) -> Result<Vec<WorkItem>, ProcessingError> {
    let entries = fs::read_dir(source_dir).map_err(|e| ProcessingError::ReadDir {
        path: source_dir.to_path_buf(),
        source: e,
    })?;

    let mut items = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("skipping unreadable entry in {}: {e}", source_dir.display());
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if SourceFormat::from_path(&path).is_none() {
            log::debug!("skipping non-image entry {}", path.display());
            continue;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output_name = naming::output_name(&path, run, items.len(), target);
        items.push(WorkItem {
            source: path,
            name,
            output_name,
        });
    }

    Ok(items)
}
