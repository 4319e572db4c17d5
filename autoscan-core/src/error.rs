use thiserror::Error;

use crate::geometry::PixelRect;

/// Failure kinds surfaced by the inspection pipeline.
///
/// Every stage returns an explicit failure instead of propagating a corrupted
/// partial result; the pipeline maps each into a terminal outcome with no
/// retries and no silent default substitution.
#[derive(Debug, Error)]
pub enum InspectError {
    /// Model file missing or corrupt. Fatal to pipeline availability, raised
    /// once at construction rather than per invocation.
    #[error("failed to load model from {path}: {reason}")]
    ModelLoad { path: String, reason: String },

    /// Invalid target dimensions or an empty source image.
    #[error("preprocess failed: {0}")]
    Preprocess(String),

    /// The detector produced an empty score vector.
    #[error("detector returned no candidates")]
    NoDetection,

    /// The clipped, denormalized box yields a zero-area crop region.
    #[error("detected box yields an empty crop region ({0:?})")]
    DegenerateBox(PixelRect),

    /// The engine's invoke call failed, or its outputs were malformed.
    #[error("inference failed: {0}")]
    Inference(String),
}

pub type Result<T> = std::result::Result<T, InspectError>;
