use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::ProcessingError;
use crate::events::Outcome;
use crate::scan::WorkItem;
use crate::transform::ImageTransform;

/// Convert one work item, classifying every failure as a `Failed` outcome.
///
/// Errors never propagate past this boundary; a single bad file must not
/// abort the batch. A partially written destination file is left as is.
pub fn convert_item(item: &WorkItem, dest_dir: &Path, transform: &dyn ImageTransform) -> Outcome {
    match convert_inner(item, dest_dir, transform) {
        Ok((initial_size, compressed_size)) => {
            log::debug!(
                "{} → {} ({} → {} bytes)",
                item.name,
                item.output_name,
                initial_size,
                compressed_size
            );
            Outcome::Converted {
                name: item.name.clone(),
                output_name: item.output_name.clone(),
                initial_size,
                compressed_size,
            }
        }
        Err(e) => {
            log::warn!("error processing {}: {e}", item.name);
            Outcome::Failed {
                name: item.name.clone(),
                reason: e.to_string(),
            }
        }
    }
}

fn convert_inner(
    item: &WorkItem,
    dest_dir: &Path,
    transform: &dyn ImageTransform,
) -> Result<(u64, u64), ProcessingError> {
    let initial_size = fs::metadata(&item.source)
        .map_err(|e| ProcessingError::ReadFile {
            path: item.source.clone(),
            source: e,
        })?
        .len();

    let mut reader = BufReader::new(File::open(&item.source).map_err(|e| {
        ProcessingError::ReadFile {
            path: item.source.clone(),
            source: e,
        }
    })?);

    let dest = dest_dir.join(&item.output_name);
    let mut writer = BufWriter::new(File::create(&dest).map_err(|e| {
        ProcessingError::WriteFile {
            path: dest.clone(),
            source: e,
        }
    })?);

    transform.transform(&mut reader, &mut writer)?;
    writer.flush().map_err(|e| ProcessingError::WriteFile {
        path: dest.clone(),
        source: e,
    })?;

    let compressed_size = fs::metadata(&dest)
        .map_err(|e| ProcessingError::ReadFile {
            path: dest,
            source: e,
        })?
        .len();

    Ok((initial_size, compressed_size))
}
