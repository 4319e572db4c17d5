//! Pipeline orchestration: detect the vehicle, crop to it, classify the crop.
//!
//! One invocation runs synchronously end to end: resample and normalize the
//! photograph, invoke the detector, decode the best box, crop the original
//! image, resample and normalize the crop, invoke the classifier, and emit a
//! scalar issue probability. Every failure is terminal for that invocation;
//! there are no retries and no state crosses invocations.

use std::path::Path;

use autoscan_utils::config::{ResizeQuality, StageSettings};
use autoscan_utils::{load_image, timing_guard};
use image::{DynamicImage, GenericImageView};

use crate::cropper::crop;
use crate::decode::DetectionOutput;
use crate::engine::{Engine, TractEngine, output_f32};
use crate::error::{InspectError, Result};
use crate::geometry::PixelRect;
use crate::preprocess::{InputSize, PreprocessConfig, preprocess_dynamic_image};

/// Fixed per-stage input resolutions plus the resize filter preference.
///
/// The resolutions mirror the trained models' shape contract and are not
/// negotiated at runtime: 320x320x3 for the detector, 256x256x3 for the
/// classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub detector_input: InputSize,
    pub classifier_input: InputSize,
    pub resize_quality: ResizeQuality,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detector_input: InputSize::new(320, 320),
            classifier_input: InputSize::new(256, 256),
            resize_quality: ResizeQuality::Quality,
        }
    }
}

impl From<&StageSettings> for PipelineConfig {
    fn from(settings: &StageSettings) -> Self {
        Self {
            detector_input: settings.detector.into(),
            classifier_input: settings.classifier.into(),
            resize_quality: settings.resize_quality,
        }
    }
}

/// Result of inspecting one photograph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inspection {
    /// Positive-class (issue) likelihood in `[0, 1]`.
    pub probability: f32,
    /// The vehicle region in original-image pixel coordinates.
    pub region: PixelRect,
    /// Pixel dimensions of the intermediate crop fed to the classifier,
    /// before resampling to the classifier input resolution.
    pub crop_size: (u32, u32),
}

impl Inspection {
    /// Human-readable result string for display sinks.
    pub fn summary(&self) -> String {
        format!("issue probability {:.1}%", self.probability * 100.0)
    }
}

/// Two-stage inspector coupling the detection and classification engines.
///
/// Both engines are owned by the inspector and passed in at construction;
/// their lifetime is scoped to the inspector's owner.
#[derive(Debug)]
pub struct Inspector {
    detector: Box<dyn Engine>,
    classifier: Box<dyn Engine>,
    config: PipelineConfig,
}

impl Inspector {
    /// Construct an inspector from already-loaded engines.
    pub fn new(
        detector: Box<dyn Engine>,
        classifier: Box<dyn Engine>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            detector,
            classifier,
            config,
        }
    }

    /// Load both ONNX models and construct an inspector.
    ///
    /// A load failure degrades the whole pipeline to unavailable and is
    /// surfaced here, once, rather than on every invocation.
    pub fn from_model_paths<P: AsRef<Path>>(
        detector_path: P,
        classifier_path: P,
        config: PipelineConfig,
    ) -> Result<Self> {
        let detector = TractEngine::load(detector_path)?;
        let classifier = TractEngine::load(classifier_path)?;
        Ok(Self::new(Box::new(detector), Box::new(classifier), config))
    }

    /// Access the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Inspect an image file on disk.
    pub fn inspect_path<P: AsRef<Path>>(&self, path: P) -> Result<Inspection> {
        let path = path.as_ref();
        let image = load_image(path).map_err(|e| {
            InspectError::Preprocess(format!("cannot load {}: {e}", path.display()))
        })?;
        self.inspect_image(&image)
    }

    /// Inspect an in-memory photograph.
    ///
    /// Stage sequence and terminal failures:
    /// detect -> [`InspectError::NoDetection`] on an empty score vector,
    /// crop -> [`InspectError::DegenerateBox`] on a zero-area region,
    /// classify -> the scalar probability.
    pub fn inspect_image(&self, image: &DynamicImage) -> Result<Inspection> {
        let _guard = timing_guard("autoscan_core::inspect_image", log::Level::Debug);
        let (orig_w, orig_h) = image.dimensions();

        let region = self.detect_region(image)?;
        let cropped =
            crop(image, &region).ok_or(InspectError::DegenerateBox(region))?;
        let crop_size = cropped.dimensions();
        log::debug!(
            "vehicle region {:?} cropped to {}x{} from {}x{} source",
            region,
            crop_size.0,
            crop_size.1,
            orig_w,
            orig_h
        );

        let probability = self.classify_crop(&cropped)?;
        Ok(Inspection {
            probability,
            region,
            crop_size,
        })
    }

    /// Run the detector and denormalize the best box against the original
    /// (unresampled) image dimensions.
    fn detect_region(&self, image: &DynamicImage) -> Result<PixelRect> {
        let _guard = timing_guard("autoscan_core::detect", log::Level::Debug);
        let config = PreprocessConfig::new(self.config.detector_input, self.config.resize_quality);
        let tensor = preprocess_dynamic_image(image, &config)?;
        let outputs = self.detector.invoke(tensor)?;

        let detection = DetectionOutput::from_tensors(&outputs)?;
        let best = detection.best_box().ok_or(InspectError::NoDetection)?;

        let (orig_w, orig_h) = image.dimensions();
        Ok(best.denormalize(orig_w, orig_h))
    }

    /// Run the classifier on the crop and read the positive-class probability.
    fn classify_crop(&self, cropped: &DynamicImage) -> Result<f32> {
        let _guard = timing_guard("autoscan_core::classify", log::Level::Debug);
        let config =
            PreprocessConfig::new(self.config.classifier_input, self.config.resize_quality);
        let tensor = preprocess_dynamic_image(cropped, &config)?;
        let outputs = self.classifier.invoke(tensor)?;

        let scores = outputs.first().ok_or_else(|| {
            InspectError::Inference("classifier produced no outputs".to_string())
        })?;
        let values = output_f32(scores)?;
        values.first().copied().ok_or_else(|| {
            InspectError::Inference("classifier output tensor is empty".to_string())
        })
    }
}
