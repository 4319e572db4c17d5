//! Pure coordinate math for detection boxes.
//!
//! Boxes stay in normalized image-fraction coordinates until a caller
//! explicitly denormalizes them against a target image's pixel dimensions.

/// Detection box in normalized `[0, 1]` image-fraction coordinates.
///
/// Row order follows the detector's output layout: `[y_min, x_min, y_max, x_max]`.
/// A box may carry a non-positive extent when the model output is degenerate;
/// that is not an error here, it simply yields no usable crop downstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub y_min: f32,
    pub x_min: f32,
    pub y_max: f32,
    pub x_max: f32,
}

impl BoundingBox {
    pub const fn new(y_min: f32, x_min: f32, y_max: f32, x_max: f32) -> Self {
        Self {
            y_min,
            x_min,
            y_max,
            x_max,
        }
    }

    /// Clip each coordinate independently to `[0, 1]`.
    pub fn clip(self) -> Self {
        Self {
            y_min: self.y_min.clamp(0.0, 1.0),
            x_min: self.x_min.clamp(0.0, 1.0),
            y_max: self.y_max.clamp(0.0, 1.0),
            x_max: self.x_max.clamp(0.0, 1.0),
        }
    }

    /// Project the normalized box onto an image of the given pixel dimensions.
    ///
    /// May produce a zero or negative-area rectangle when `x_max <= x_min` or
    /// `y_max <= y_min`; callers treat that as "no usable region".
    pub fn denormalize(&self, image_width: u32, image_height: u32) -> PixelRect {
        let w = image_width as f32;
        let h = image_height as f32;
        PixelRect {
            x: self.x_min * w,
            y: self.y_min * h,
            width: (self.x_max - self.x_min) * w,
            height: (self.y_max - self.y_min) * h,
        }
    }
}

/// Axis-aligned rectangle in absolute pixel units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    /// Returns `true` when the rectangle cannot contain any pixels.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Intersect the rectangle with `[0, img_w) x [0, img_h)` and round the
    /// surviving edges to integer pixel bounds.
    ///
    /// A rectangle overhanging an image edge keeps only the pixels it
    /// actually covers; the overhang is discarded, not shifted inward.
    /// Returns `(x, y, width, height)` of the clamped sub-grid, or `None`
    /// when the intersection is empty.
    pub fn integer_bounds(&self, img_w: u32, img_h: u32) -> Option<(u32, u32, u32, u32)> {
        if self.is_degenerate() {
            return None;
        }
        let x0 = self.x.max(0.0);
        let y0 = self.y.max(0.0);
        let x1 = (self.x + self.width).min(img_w as f32);
        let y1 = (self.y + self.height).min(img_h as f32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        let x = x0.round() as u32;
        let y = y0.round() as u32;
        let width = (x1.round() as u32).saturating_sub(x);
        let height = (y1.round() as u32).saturating_sub(y);
        if width == 0 || height == 0 {
            return None;
        }
        Some((x, y, width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_clamps_each_coordinate_independently() {
        let clipped = BoundingBox::new(-0.2, 1.5, 0.4, 0.9).clip();
        assert_eq!(clipped, BoundingBox::new(0.0, 1.0, 0.4, 0.9));
    }

    #[test]
    fn denormalize_applies_width_and_height_axes() {
        let rect = BoundingBox::new(0.0, 0.0, 0.5, 0.5).denormalize(200, 100);
        assert_eq!(
            rect,
            PixelRect {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 50.0
            }
        );
    }

    #[test]
    fn inverted_box_denormalizes_to_negative_extent() {
        let rect = BoundingBox::new(0.8, 0.8, 0.2, 0.2).denormalize(100, 100);
        assert!(rect.is_degenerate());
        assert_eq!(rect.integer_bounds(100, 100), None);
    }

    #[test]
    fn integer_bounds_clamps_to_image_extent() {
        let rect = PixelRect {
            x: 90.0,
            y: 90.0,
            width: 50.0,
            height: 50.0,
        };
        assert_eq!(rect.integer_bounds(100, 100), Some((90, 90, 10, 10)));
    }

    #[test]
    fn integer_bounds_drops_negative_origin_overhang() {
        let rect = PixelRect {
            x: -10.0,
            y: 0.0,
            width: 30.0,
            height: 10.0,
        };
        // Only x in [0, 20) is covered; the overhang must not widen the crop.
        assert_eq!(rect.integer_bounds(100, 100), Some((0, 0, 20, 10)));
    }

    #[test]
    fn integer_bounds_rejects_rect_entirely_left_of_image() {
        let rect = PixelRect {
            x: -30.0,
            y: 10.0,
            width: 20.0,
            height: 20.0,
        };
        assert_eq!(rect.integer_bounds(100, 100), None);
    }

    #[test]
    fn integer_bounds_rejects_zero_width() {
        let rect = PixelRect {
            x: 10.0,
            y: 10.0,
            width: 0.0,
            height: 20.0,
        };
        assert_eq!(rect.integer_bounds(100, 100), None);
    }

    #[test]
    fn integer_bounds_rejects_origin_outside_image() {
        let rect = PixelRect {
            x: 120.0,
            y: 10.0,
            width: 20.0,
            height: 20.0,
        };
        assert_eq!(rect.integer_bounds(100, 100), None);
    }
}
