//! Image encoding: rendered pages → JPEG or PNG bytes.
//!
//! JPEG goes through an RGB8 conversion first — the rasteriser hands back
//! RGBA and the JPEG format has no alpha channel. PNG keeps whatever pixel
//! layout the rasteriser produced, since PNG is lossless either way.

use crate::output::RasterFormat;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rendered page in the requested raster format.
///
/// `jpeg_quality` is 1–100 and ignored for PNG.
pub fn encode_image(
    image: &DynamicImage,
    format: RasterFormat,
    jpeg_quality: u8,
) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();

    match format {
        RasterFormat::Jpeg => {
            let rgb = image.to_rgb8();
            let mut cursor = Cursor::new(&mut buf);
            let mut encoder = JpegEncoder::new_with_quality(&mut cursor, jpeg_quality);
            encoder.encode(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                image::ExtendedColorType::Rgb8,
            )?;
        }
        RasterFormat::Png => {
            image.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
        }
    }

    debug!("encoded {}x{} page → {} bytes", image.width(), image.height(), buf.len());
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn red_square() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn png_round_trips() {
        let bytes = encode_image(&red_square(), RasterFormat::Png, 90).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.height(), 16);
    }

    #[test]
    fn jpeg_handles_alpha_input() {
        // RGBA input must not fail even though JPEG has no alpha channel.
        let bytes = encode_image(&red_square(), RasterFormat::Jpeg, 90).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 16);
        // JPEG magic.
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn lower_quality_produces_smaller_jpeg() {
        // Use a noisy image so quality actually matters.
        let noisy = DynamicImage::ImageRgba8(RgbaImage::from_fn(64, 64, |x, y| {
            Rgba([
                (x * 7 % 256) as u8,
                (y * 13 % 256) as u8,
                ((x + y) * 31 % 256) as u8,
                255,
            ])
        }));
        let high = encode_image(&noisy, RasterFormat::Jpeg, 95).unwrap();
        let low = encode_image(&noisy, RasterFormat::Jpeg, 10).unwrap();
        assert!(low.len() < high.len());
    }
}
