use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Input formats the pipeline will pick up from the source directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Png,
    Jpg,
    Webp,
    Gif,
    Bmp,
    Tiff,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(SourceFormat::Png),
            "jpg" | "jpeg" => Some(SourceFormat::Jpg),
            "webp" => Some(SourceFormat::Webp),
            "gif" => Some(SourceFormat::Gif),
            "bmp" => Some(SourceFormat::Bmp),
            "tif" | "tiff" => Some(SourceFormat::Tiff),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Png => "PNG",
            SourceFormat::Jpg => "JPEG",
            SourceFormat::Webp => "WebP",
            SourceFormat::Gif => "GIF",
            SourceFormat::Bmp => "BMP",
            SourceFormat::Tiff => "TIFF",
        }
    }
}

/// Output format of a batch. Fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Png,
    Jpg,
    Webp,
}

impl TargetFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Png => "png",
            TargetFormat::Jpg => "jpg",
            TargetFormat::Webp => "webp",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetFormat::Png => "PNG",
            TargetFormat::Jpg => "JPEG",
            TargetFormat::Webp => "WebP",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TargetFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png" => Ok(TargetFormat::Png),
            "jpg" | "jpeg" => Ok(TargetFormat::Jpg),
            "webp" => Ok(TargetFormat::Webp),
            _ => Err(format!("unknown target format: {s}. Use: png, jpg, webp")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn source_format_from_extension() {
        assert_eq!(
            SourceFormat::from_path(&PathBuf::from("a/photo.JPG")),
            Some(SourceFormat::Jpg)
        );
        assert_eq!(
            SourceFormat::from_path(&PathBuf::from("shot.tiff")),
            Some(SourceFormat::Tiff)
        );
        assert_eq!(SourceFormat::from_path(&PathBuf::from("notes.txt")), None);
        assert_eq!(SourceFormat::from_path(&PathBuf::from("no_extension")), None);
    }

    #[test]
    fn target_format_round_trip() {
        for s in ["png", "jpg", "jpeg", "WEBP"] {
            assert!(TargetFormat::from_str(s).is_ok());
        }
        assert!(TargetFormat::from_str("avif").is_err());
        assert_eq!(TargetFormat::Webp.extension(), "webp");
    }
}
