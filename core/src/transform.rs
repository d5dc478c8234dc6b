use std::io::{Cursor, Read, Write};

use image::{DynamicImage, GenericImageView, ImageFormat as ImgFormat};

use crate::error::ProcessingError;
use crate::format::TargetFormat;

/// The codec seam of the pipeline.
///
/// Implementations read one source image from `input` and write the encoded
/// result to `output`. They must be pure and stateless; any failure is
/// reported per item and never aborts the batch.
pub trait ImageTransform: Send + Sync {
    fn transform(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
    ) -> Result<(), ProcessingError>;
}

/// Production transform: decode with the `image` crate, re-encode at the
/// configured target format and quality.
pub struct CodecTransform {
    target: TargetFormat,
    quality: u8,
}

impl CodecTransform {
    pub fn new(target: TargetFormat, quality: u8) -> Self {
        Self { target, quality }
    }
}

impl ImageTransform for CodecTransform {
    fn transform(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
    ) -> Result<(), ProcessingError> {
        // The codec needs the whole frame; buffering happens here, inside the
        // collaborator, not in the pipeline.
        let mut data = Vec::new();
        input.read_to_end(&mut data)?;

        let img = image::load_from_memory(&data)
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;

        log::debug!(
            "transforming {}x{} image to {} at quality {}",
            img.width(),
            img.height(),
            self.target.as_str(),
            self.quality
        );

        let encoded = match self.target {
            TargetFormat::Png => encode_png(&img)?,
            TargetFormat::Jpg => encode_jpg(&img, self.quality)?,
            TargetFormat::Webp => encode_webp(&img, self.quality)?,
        };

        output.write_all(&encoded)?;
        Ok(())
    }
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, ProcessingError> {
    let mut output = Vec::new();
    let mut cursor = Cursor::new(&mut output);
    img.write_to(&mut cursor, ImgFormat::Png)
        .map_err(|e| ProcessingError::Encode(format!("Failed to encode PNG: {e}")))?;
    Ok(output)
}

fn encode_jpg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, ProcessingError> {
    let mut output = Vec::new();
    let mut cursor = Cursor::new(&mut output);

    // JPEG doesn't support alpha
    let rgb_img = img.to_rgb8();

    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);
    encoder
        .encode(
            rgb_img.as_raw(),
            rgb_img.width(),
            rgb_img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ProcessingError::Encode(format!("Failed to encode JPEG: {e}")))?;

    Ok(output)
}

fn encode_webp(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, ProcessingError> {
    let rgba = img.to_rgba8();
    let (width, height) = img.dimensions();

    let encoder = webp::Encoder::from_rgba(rgba.as_raw(), width, height);
    let encoded = encoder.encode(quality as f32);

    Ok(encoded.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A small in-memory PNG fixture.
    fn png_fixture() -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::from_fn(16, 16, |x, y| {
            image::Rgba([(x * 16) as u8, (y * 16) as u8, 128, 255])
        }));
        let mut data = Vec::new();
        img.write_to(&mut Cursor::new(&mut data), ImgFormat::Png)
            .unwrap();
        data
    }

    #[test]
    fn encodes_webp_from_png_input() {
        let input = png_fixture();
        let transform = CodecTransform::new(TargetFormat::Webp, 20);
        let mut out = Vec::new();
        transform
            .transform(&mut Cursor::new(&input), &mut out)
            .unwrap();
        assert!(!out.is_empty());
        // RIFF/WEBP container signature
        assert_eq!(&out[0..4], b"RIFF");
        assert_eq!(&out[8..12], b"WEBP");
    }

    #[test]
    fn encodes_jpg_and_png_targets() {
        let input = png_fixture();
        for target in [TargetFormat::Jpg, TargetFormat::Png] {
            let transform = CodecTransform::new(target, 80);
            let mut out = Vec::new();
            transform
                .transform(&mut Cursor::new(&input), &mut out)
                .unwrap();
            assert!(!out.is_empty(), "{} output empty", target.as_str());
        }
    }

    #[test]
    fn garbage_input_is_a_decode_error() {
        let transform = CodecTransform::new(TargetFormat::Webp, 20);
        let mut out = Vec::new();
        let err = transform
            .transform(&mut Cursor::new(b"definitely not an image"), &mut out)
            .unwrap_err();
        assert!(matches!(err, ProcessingError::Decode(_)));
        assert!(out.is_empty());
    }
}
