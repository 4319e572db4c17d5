//! Shared configuration types consumed across the autoscan workspace.
//!
//! These structures provide a common representation for model locations and
//! per-stage inference settings that can be serialized to disk and layered
//! with command-line overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Resize filter preference controlling the quality vs speed trade-off.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResizeQuality {
    /// Preserve visual quality when resizing (default, Triangle filter).
    #[default]
    Quality,
    /// Prioritize throughput for batch inference (Nearest filter).
    Speed,
}

impl fmt::Display for ResizeQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ResizeQuality::Quality => "quality",
                ResizeQuality::Speed => "speed",
            }
        )
    }
}

impl FromStr for ResizeQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quality" => Ok(ResizeQuality::Quality),
            "speed" => Ok(ResizeQuality::Speed),
            other => Err(format!(
                "invalid resize quality '{other}'; expected 'quality' or 'speed'"
            )),
        }
    }
}

/// Inference input resolution in pixels (width x height).
///
/// Source images are stretched to these dimensions before being passed to
/// the corresponding model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct InputDimensions {
    pub width: u32,
    pub height: u32,
}

impl InputDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Per-stage preprocessing settings.
///
/// The input resolutions mirror the trained models' fixed shape contract:
/// the detector consumes 320x320 and the classifier 256x256.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StageSettings {
    pub detector: InputDimensions,
    pub classifier: InputDimensions,
    /// Choose between quality-focused or speed-focused resizing.
    pub resize_quality: ResizeQuality,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            detector: InputDimensions::new(320, 320),
            classifier: InputDimensions::new(256, 256),
            resize_quality: ResizeQuality::Quality,
        }
    }
}

/// On-disk locations of the two ONNX models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ModelSettings {
    pub detector: PathBuf,
    pub classifier: PathBuf,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            detector: PathBuf::from("models/vehicle_detector_320.onnx"),
            classifier: PathBuf::from("models/damage_classifier_256.onnx"),
        }
    }
}

/// Top-level application settings persisted as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub models: ModelSettings,
    pub input: StageSettings,
    /// Probability at or above which the verdict wording reports an issue.
    pub verdict_threshold: f32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            models: ModelSettings::default(),
            input: StageSettings::default(),
            verdict_threshold: 0.5,
        }
    }
}

impl AppSettings {
    /// Load settings from a JSON file on disk.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse settings JSON {}", path.display()))
    }

    /// Persist settings as pretty-printed JSON.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(self).context("failed to serialize settings")?;
        fs::write(path, raw)
            .with_context(|| format!("failed to write settings to {}", path.display()))
    }
}
