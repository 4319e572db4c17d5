//! Region extraction from a source photograph.

use image::{DynamicImage, GenericImageView};

use crate::geometry::PixelRect;

/// Extract the pixel sub-grid covered by `rect` as a new owned image.
///
/// The rectangle is rounded to integer pixel bounds and clamped to the image
/// extent. Returns `None` when the clamped rectangle has zero width or
/// height; the source image is never mutated.
pub fn crop(image: &DynamicImage, rect: &PixelRect) -> Option<DynamicImage> {
    let (img_w, img_h) = image.dimensions();
    let (x, y, width, height) = rect.integer_bounds(img_w, img_h)?;
    let sub = image::imageops::crop_imm(image, x, y, width, height).to_image();
    Some(DynamicImage::ImageRgba8(sub))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn gradient_image(width: u32, height: u32) -> DynamicImage {
        let mut raw = RgbaImage::new(width, height);
        for (x, y, pixel) in raw.enumerate_pixels_mut() {
            *pixel = Rgba([x as u8, y as u8, 0, 255]);
        }
        DynamicImage::ImageRgba8(raw)
    }

    #[test]
    fn crop_returns_exact_subgrid() {
        let source = gradient_image(100, 100);
        let rect = PixelRect {
            x: 10.0,
            y: 20.0,
            width: 30.0,
            height: 40.0,
        };

        let cropped = crop(&source, &rect).expect("in-bounds crop");
        assert_eq!(cropped.dimensions(), (30, 40));
        // Top-left pixel of the crop came from source (10, 20).
        let pixel = cropped.to_rgba8().get_pixel(0, 0).0;
        assert_eq!(pixel[0], 10);
        assert_eq!(pixel[1], 20);
    }

    #[test]
    fn crop_clamps_rect_to_image_bounds() {
        let source = gradient_image(100, 100);
        let rect = PixelRect {
            x: 90.0,
            y: 90.0,
            width: 50.0,
            height: 50.0,
        };

        let cropped = crop(&source, &rect).expect("clamped crop");
        assert_eq!(cropped.dimensions(), (10, 10));
    }

    #[test]
    fn crop_keeps_only_the_covered_pixels_of_a_negative_origin_rect() {
        let source = gradient_image(100, 100);
        let rect = PixelRect {
            x: -10.0,
            y: -5.0,
            width: 30.0,
            height: 25.0,
        };

        let cropped = crop(&source, &rect).expect("clamped crop");
        assert_eq!(cropped.dimensions(), (20, 20));
        // The crop starts at source (0, 0), not at the shifted origin.
        let pixel = cropped.to_rgba8().get_pixel(0, 0).0;
        assert_eq!(pixel[0], 0);
        assert_eq!(pixel[1], 0);
    }

    #[test]
    fn zero_width_rect_yields_none() {
        let source = gradient_image(100, 100);
        let rect = PixelRect {
            x: 50.0,
            y: 50.0,
            width: 0.0,
            height: 50.0,
        };
        assert!(crop(&source, &rect).is_none());
    }

    #[test]
    fn negative_extent_rect_yields_none() {
        let source = gradient_image(100, 100);
        let rect = PixelRect {
            x: 50.0,
            y: 50.0,
            width: -10.0,
            height: 10.0,
        };
        assert!(crop(&source, &rect).is_none());
    }
}
