//! Core inference primitives for two-stage vehicle inspection.
//!
//! This crate preprocesses photographs into model-ready tensors, runs a
//! detection model to locate the vehicle, crops to the detected region, and
//! classifies the crop into a scalar issue probability. Inference runs on
//! `tract-onnx` behind a narrow [`engine::Engine`] trait.

/// Region extraction from pixel-space rectangles.
pub mod cropper;
/// Detection-output decoding (best-box selection from raw score/box tensors).
pub mod decode;
/// Inference engine abstraction and the tract-backed implementation.
pub mod engine;
/// Pipeline error kinds.
pub mod error;
/// Normalized box coordinate math: clipping and denormalization.
pub mod geometry;
/// Pipeline orchestration: detect, crop, classify.
pub mod pipeline;
/// Image pre-processing (stretch resampling, tensor normalization).
pub mod preprocess;

pub use cropper::crop;
pub use decode::DetectionOutput;
pub use engine::{Engine, TractEngine, output_f32};
pub use error::{InspectError, Result};
pub use geometry::{BoundingBox, PixelRect};
pub use pipeline::{Inspection, Inspector, PipelineConfig};
pub use preprocess::{InputSize, PreprocessConfig, normalize, preprocess_dynamic_image, resample};

/// Returns the crate version for diagnostics.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
