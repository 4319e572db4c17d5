use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, RgbaImage, imageops::FilterType};
use ndarray::Array3;

/// Load an image from disk into memory.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let path_ref = path.as_ref();
    image::open(path_ref).with_context(|| format!("failed to open image {}", path_ref.display()))
}

/// Stretch an image to exactly the requested resolution using the provided filter.
///
/// The aspect ratio is deliberately not preserved: source dimensions map
/// directly onto target dimensions with no letterboxing or padding, matching
/// the models' trained input distortion.
pub fn stretch_resize(
    image: &DynamicImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> RgbaImage {
    image.resize_exact(width, height, filter).to_rgba8()
}

/// Convert an RGBA image into an interleaved HWC float array in `[0, 1]`.
///
/// The alpha channel is read but discarded; the remaining channels keep the
/// `[R, G, B]` per-pixel order the models were trained against.
pub fn rgba_to_unit_hwc(image: &RgbaImage) -> Array3<f32> {
    let (width, height) = image.dimensions();
    let mut array = Array3::<f32>::zeros((height as usize, width as usize, 3));
    for (x, y, pixel) in image.enumerate_pixels() {
        let (xi, yi) = (x as usize, y as usize);
        array[(yi, xi, 0)] = pixel[0] as f32 / 255.0;
        array[(yi, xi, 1)] = pixel[1] as f32 / 255.0;
        array[(yi, xi, 2)] = pixel[2] as f32 / 255.0;
    }
    array
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn stretch_resize_hits_exact_target_dimensions() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            30,
            20,
            Rgba([10, 20, 30, 255]),
        ));
        let resized = stretch_resize(&source, 7, 13, FilterType::Triangle);
        assert_eq!(resized.dimensions(), (7, 13));
    }

    #[test]
    fn rgba_to_unit_hwc_normalizes_and_drops_alpha() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([0, 128, 255, 7]));
        image.put_pixel(1, 0, Rgba([255, 0, 51, 200]));

        let array = rgba_to_unit_hwc(&image);
        assert_eq!(array.shape(), &[1, 2, 3]);

        assert_eq!(array[(0, 0, 0)], 0.0);
        assert_eq!(array[(0, 0, 1)], 128.0 / 255.0);
        assert_eq!(array[(0, 0, 2)], 1.0);
        assert_eq!(array[(0, 1, 0)], 1.0);
        assert_eq!(array[(0, 1, 2)], 51.0 / 255.0);
    }

    #[test]
    fn extremes_map_to_zero_and_one() {
        let black = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 255]));
        assert!(rgba_to_unit_hwc(&black).iter().all(|v| *v == 0.0));

        let white = RgbaImage::from_pixel(3, 3, Rgba([255, 255, 255, 0]));
        assert!(rgba_to_unit_hwc(&white).iter().all(|v| *v == 1.0));
    }
}
