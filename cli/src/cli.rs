use std::path::PathBuf;

use clap::Parser;

/// Batch-convert a folder of images, streaming per-file progress
#[derive(Debug, Parser)]
#[command(name = "imgstream", version, about)]
pub struct Cli {
    /// Source directory with images to convert
    #[arg(default_value = "images")]
    pub source: PathBuf,

    /// Destination directory for converted files
    #[arg(default_value = "compressed_images")]
    pub dest: PathBuf,

    /// Target format (png, jpg, webp)
    #[arg(long, short = 't', value_name = "FORMAT", default_value = "webp")]
    pub to: String,

    /// Quality for lossy formats (0-100)
    #[arg(short, long, default_value_t = 20, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: u8,

    /// Maximum conversions in flight at once
    #[arg(short = 'j', long, default_value_t = 4)]
    pub jobs: usize,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
