use image::GrayImage;
use thiserror::Error;

/// Fixed contrast boost applied after grayscale conversion.
const CONTRAST_FACTOR: f32 = 2.0;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("failed to decode screenshot: {0}")]
    Decode(#[from] image::ImageError),
}

/// Normalize a raw screenshot for recognition: grayscale conversion, then a
/// fixed contrast stretch. The order is load-bearing — stretching a color
/// image moves each channel independently before they are collapsed to gray.
pub fn normalize(png: &[u8]) -> Result<GrayImage, PreprocessError> {
    let image = image::load_from_memory(png)?;
    let mut gray = image.to_luma8();
    stretch_contrast(&mut gray);
    Ok(gray)
}

/// Linear stretch about mid-gray: v' = 128 + factor * (v - 128), clamped.
fn stretch_contrast(image: &mut GrayImage) {
    for pixel in image.pixels_mut() {
        pixel.0[0] = stretch(pixel.0[0]);
    }
}

fn stretch(value: u8) -> u8 {
    (128.0 + CONTRAST_FACTOR * (f32::from(value) - 128.0)).clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    use super::*;

    fn png_bytes(image: RgbImage) -> Vec<u8> {
        let mut bytes = Cursor::new(vec![]);
        DynamicImage::ImageRgb8(image)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    fn saturated_test_image() -> RgbImage {
        RgbImage::from_fn(4, 2, |x, _| match x {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([0, 255, 0]),
            2 => Rgb([0, 0, 255]),
            _ => Rgb([200, 40, 90]),
        })
    }

    #[test]
    fn output_is_single_channel() {
        let normalized = normalize(&png_bytes(saturated_test_image())).unwrap();
        assert_eq!(normalized.dimensions(), (4, 2));
    }

    #[test]
    fn grayscale_happens_before_contrast() {
        let image = saturated_test_image();

        let normalized = normalize(&png_bytes(image.clone())).unwrap();

        // The reverse order: stretch each color channel, then convert.
        let mut channel_stretched = image;
        for pixel in channel_stretched.pixels_mut() {
            for channel in &mut pixel.0 {
                *channel = stretch(*channel);
            }
        }
        let reversed = DynamicImage::ImageRgb8(channel_stretched).to_luma8();

        assert_ne!(normalized.as_raw(), reversed.as_raw());
    }

    #[test]
    fn normalization_is_deterministic() {
        let bytes = png_bytes(saturated_test_image());
        assert_eq!(normalize(&bytes).unwrap(), normalize(&bytes).unwrap());
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            normalize(b"definitely not a png"),
            Err(PreprocessError::Decode(_))
        ));
    }

    #[test]
    fn stretch_clamps_at_the_extremes() {
        assert_eq!(stretch(0), 0);
        assert_eq!(stretch(255), 255);
        assert_eq!(stretch(128), 128);
        assert_eq!(stretch(100), 72);
    }
}
