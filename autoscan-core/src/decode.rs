//! Detection post-processing: best-box selection from raw score/box tensors.

use tract_onnx::prelude::Tensor;

use crate::engine::output_f32;
use crate::error::{InspectError, Result};
use crate::geometry::BoundingBox;

/// Raw detector output: a score vector of length N and a box tensor of
/// length N x 4, each row `[y_min, x_min, y_max, x_max]` normalized to
/// `[0, 1]` image-fraction coordinates.
///
/// Values can only be constructed through checked decode steps, so the
/// `scores.len() * 4 == boxes.len()` invariant always holds.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOutput {
    scores: Vec<f32>,
    boxes: Vec<f32>,
}

impl DetectionOutput {
    /// Build a detection output from already-extracted buffers, validating
    /// the score/box length invariant.
    pub fn new(scores: Vec<f32>, boxes: Vec<f32>) -> Result<Self> {
        if scores.len() * 4 != boxes.len() {
            return Err(InspectError::Inference(format!(
                "detector output shape mismatch: {} scores but {} box values (expected {})",
                scores.len(),
                boxes.len(),
                scores.len() * 4
            )));
        }
        Ok(Self { scores, boxes })
    }

    /// Decode the detector's raw output tensors.
    ///
    /// Tensor 0 holds the scores and tensor 1 the boxes; both must be f32.
    pub fn from_tensors(outputs: &[Tensor]) -> Result<Self> {
        let [scores, boxes, ..] = outputs else {
            return Err(InspectError::Inference(format!(
                "detector produced {} output(s), expected scores and boxes",
                outputs.len()
            )));
        };
        Self::new(output_f32(scores)?.to_vec(), output_f32(boxes)?.to_vec())
    }

    /// Number of candidate detections.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Select the highest-scoring detection and return its clipped box.
    ///
    /// Takes the argmax of the score vector (first index on ties) and clips
    /// each box coordinate to `[0, 1]`. No confidence threshold is applied:
    /// any non-empty score vector yields a box, so a crop is always
    /// attempted. Returns `None` only when the score vector is empty.
    pub fn best_box(&self) -> Option<BoundingBox> {
        let first = *self.scores.first()?;
        let mut best_index = 0;
        let mut best_score = first;
        for (index, &score) in self.scores.iter().enumerate().skip(1) {
            // A NaN best must not stick just because every comparison
            // against it is false.
            if score > best_score || best_score.is_nan() {
                best_index = index;
                best_score = score;
            }
        }

        let row = &self.boxes[best_index * 4..best_index * 4 + 4];
        Some(BoundingBox::new(row[0], row[1], row[2], row[3]).clip())
    }
}
