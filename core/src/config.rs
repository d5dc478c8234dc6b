use std::path::PathBuf;

use crate::format::TargetFormat;

#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Directory scanned (flat, non-recursive) for source images
    pub source_dir: PathBuf,
    /// Directory converted files are written to, created if absent
    pub dest_dir: PathBuf,
    /// Output codec, fixed for the whole batch
    pub target: TargetFormat,
    /// Encoding quality 0-100 (lower = smaller file, worse quality)
    pub quality: u8,
    /// Maximum conversions in flight at once
    pub concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("images"),
            dest_dir: PathBuf::from("compressed_images"),
            target: TargetFormat::Webp,
            quality: 20,
            concurrency: 4,
        }
    }
}
