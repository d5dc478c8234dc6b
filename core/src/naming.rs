//! Collision-free output naming.
//!
//! Output files are named `<stem>-<run tag>-<seq>.<ext>`. The run tag is
//! random per batch, so re-running against the same source directory never
//! overwrites a prior run's output. The sequence number is assigned during
//! enumeration, so two sources with the same stem stay distinct within a run.

use std::fmt;
use std::path::Path;

use uuid::Uuid;

use crate::format::TargetFormat;

/// Random tag identifying one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTag(String);

impl RunTag {
    pub fn new() -> Self {
        let id = Uuid::new_v4().simple().to_string();
        Self(id[..8].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunTag {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derive the output file name for one source file.
pub fn output_name(source: &Path, run: &RunTag, seq: usize, target: TargetFormat) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    format!("{stem}-{run}-{seq}.{}", target.extension())
}
