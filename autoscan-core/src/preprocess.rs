//! Preprocessing utilities for preparing photographs for inference.
//!
//! The helpers in this module stretch images to a model's fixed input
//! resolution and convert them into the interleaved `[1, H, W, 3]` float
//! tensor layout in `[0, 1]` that both models were trained against.

use autoscan_utils::config::{InputDimensions, ResizeQuality};
use autoscan_utils::{rgba_to_unit_hwc, stretch_resize, timing_guard};
use image::{DynamicImage, GenericImageView, RgbaImage, imageops::FilterType};
use tract_onnx::prelude::Tensor;

use crate::error::{InspectError, Result};

/// Desired model input resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSize {
    /// The width of the input tensor.
    pub width: u32,
    /// The height of the input tensor.
    pub height: u32,
}

impl InputSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl From<InputDimensions> for InputSize {
    fn from(dimensions: InputDimensions) -> Self {
        InputSize::new(dimensions.width, dimensions.height)
    }
}

/// Configuration for preprocessing an image before inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessConfig {
    /// The target input size for the model.
    pub input_size: InputSize,
    /// Resize filter preference controlling the quality vs speed trade-off.
    pub resize_quality: ResizeQuality,
}

impl PreprocessConfig {
    pub const fn new(input_size: InputSize, resize_quality: ResizeQuality) -> Self {
        Self {
            input_size,
            resize_quality,
        }
    }

    fn resize_filter(&self) -> FilterType {
        match self.resize_quality {
            ResizeQuality::Quality => FilterType::Triangle,
            ResizeQuality::Speed => FilterType::Nearest,
        }
    }
}

/// Stretch an image to the configured input resolution.
///
/// Always maps source dimensions directly onto the target (non-uniform
/// scale); no letterboxing or padding. An already-exact-size image passes
/// through with its pixels unchanged.
pub fn resample(image: &DynamicImage, config: &PreprocessConfig) -> Result<RgbaImage> {
    let input_w = config.input_size.width;
    let input_h = config.input_size.height;
    if input_w == 0 || input_h == 0 {
        return Err(InspectError::Preprocess(format!(
            "target dimensions must be greater than zero (got {input_w}x{input_h})"
        )));
    }

    let (orig_w, orig_h) = image.dimensions();
    if orig_w == 0 || orig_h == 0 {
        return Err(InspectError::Preprocess(
            "source image has no pixels".to_string(),
        ));
    }

    if orig_w == input_w && orig_h == input_h {
        return Ok(image.to_rgba8());
    }
    Ok(stretch_resize(image, input_w, input_h, config.resize_filter()))
}

/// Convert an RGBA byte grid into an interleaved `[1, H, W, 3]` f32 tensor.
///
/// Element `(row * W + col) * 3 + c` equals `channel_byte / 255.0` for c in
/// {R, G, B}; the alpha channel is read but discarded. Pure and
/// deterministic; output length is exactly `W * H * 3`.
pub fn normalize(image: &RgbaImage) -> Result<Tensor> {
    let (width, height) = image.dimensions();
    let hwc = rgba_to_unit_hwc(image);
    let (data, offset) = hwc.into_raw_vec_and_offset();
    debug_assert_eq!(offset, Some(0), "expected contiguous array");

    let shape = [1usize, height as usize, width as usize, 3];
    Tensor::from_shape(&shape, &data)
        .map_err(|e| InspectError::Preprocess(format!("failed to build input tensor: {e}")))
}

/// Resample and normalize an in-memory image in one step.
pub fn preprocess_dynamic_image(image: &DynamicImage, config: &PreprocessConfig) -> Result<Tensor> {
    let _guard = timing_guard("autoscan_core::preprocess", log::Level::Trace);
    let resized = resample(image, config)?;
    normalize(&resized)
}
