use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use autoscan_core::{Inspection, Inspector, PipelineConfig};
use autoscan_utils::{config::AppSettings, init_logging, normalize_path};
use clap::Parser;
use log::{debug, info, warn};
use serde::Serialize;
use walkdir::WalkDir;

/// Run two-stage vehicle inspection over images or directories.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct InspectArgs {
    /// Path to an image file or a directory containing images.
    #[arg(short, long)]
    input: PathBuf,

    /// Path to the vehicle detector ONNX model (overrides the settings file).
    #[arg(long)]
    detector: Option<PathBuf>,

    /// Path to the issue classifier ONNX model (overrides the settings file).
    #[arg(long)]
    classifier: Option<PathBuf>,

    /// Optional settings JSON (defaults to built-in parameters).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Resize quality mode: `quality` (Triangle) or `speed` (fast Nearest).
    #[arg(long, value_name = "MODE")]
    resize_quality: Option<autoscan_utils::config::ResizeQuality>,

    /// Override the probability at which the verdict reports an issue.
    #[arg(long)]
    threshold: Option<f32>,

    /// Write results to a JSON file instead of stdout.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Directory to write the intermediate vehicle crops.
    #[arg(long)]
    crop_dir: Option<PathBuf>,

    /// Log per-stage timing information.
    #[arg(long)]
    timings: bool,
}

#[derive(Debug, Serialize)]
struct InspectionRecord {
    image: String,
    probability: f32,
    region: [f32; 4],
    crop_size: [u32; 2],
    verdict: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    crop: Option<String>,
}

fn main() -> Result<()> {
    init_logging(log::LevelFilter::Info)?;
    let args = InspectArgs::parse();
    autoscan_utils::configure_telemetry(args.timings, log::LevelFilter::Trace);

    let input_path = normalize_path(&args.input)?;
    let crop_dir = if let Some(dir) = args.crop_dir.as_ref() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create crop directory {}", dir.display()))?;
        Some(normalize_path(dir)?)
    } else {
        None
    };

    let mut settings = load_settings(args.config.as_ref())?;
    apply_cli_overrides(&mut settings, &args);
    let detector_path = normalize_path(&settings.models.detector)?;
    let classifier_path = normalize_path(&settings.models.classifier)?;

    let pipeline_config: PipelineConfig = (&settings.input).into();
    info!(
        "Loading detector {} ({}x{}) and classifier {} ({}x{})",
        detector_path.display(),
        pipeline_config.detector_input.width,
        pipeline_config.detector_input.height,
        classifier_path.display(),
        pipeline_config.classifier_input.width,
        pipeline_config.classifier_input.height
    );
    let inspector = Inspector::from_model_paths(&detector_path, &classifier_path, pipeline_config)?;

    let images = collect_images(&input_path)?;
    if images.is_empty() {
        anyhow::bail!(
            "no images found at {} (supported extensions: jpg, jpeg, png, bmp, webp)",
            input_path.display()
        );
    }

    info!("Inspecting {} image(s)...", images.len());
    let mut results = Vec::with_capacity(images.len());
    for image_path in images {
        match inspect_one(&inspector, &image_path, crop_dir.as_deref(), settings.verdict_threshold)
        {
            Ok(record) => {
                info!("{}: {}", image_path.display(), record.verdict);
                results.push(record);
            }
            Err(err) => {
                warn!("Failed to inspect {}: {err}", image_path.display());
            }
        }
    }

    if results.is_empty() {
        anyhow::bail!("all inspections failed; cannot produce output");
    }

    if let Some(json_path) = args.json.as_ref() {
        if let Some(dir) = json_path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
        }
        let file = File::create(json_path)
            .with_context(|| format!("failed to create {}", json_path.display()))?;
        serde_json::to_writer_pretty(file, &results)
            .with_context(|| format!("failed to write results to {}", json_path.display()))?;
        info!("Wrote results to {}", json_path.display());
    } else {
        for record in &results {
            println!("{}: {}", record.image, record.verdict);
        }
    }

    Ok(())
}

fn load_settings(config_path: Option<&PathBuf>) -> Result<AppSettings> {
    if let Some(path) = config_path {
        let resolved = normalize_path(path)?;
        AppSettings::load_from_path(&resolved)
    } else {
        Ok(AppSettings::default())
    }
}

fn apply_cli_overrides(settings: &mut AppSettings, args: &InspectArgs) {
    if let Some(path) = args.detector.as_ref() {
        settings.models.detector = path.clone();
    }
    if let Some(path) = args.classifier.as_ref() {
        settings.models.classifier = path.clone();
    }
    if let Some(quality) = args.resize_quality {
        settings.input.resize_quality = quality;
    }
    if let Some(threshold) = args.threshold {
        settings.verdict_threshold = threshold;
    }
}

fn inspect_one(
    inspector: &Inspector,
    image_path: &Path,
    crop_dir: Option<&Path>,
    threshold: f32,
) -> Result<InspectionRecord> {
    let image = autoscan_utils::load_image(image_path)?;
    let inspection = inspector.inspect_image(&image)?;

    let crop_path = if let Some(dir) = crop_dir {
        match save_crop(&image, &inspection, image_path, dir) {
            Ok(path) => {
                debug!("Saved crop to {}", path.display());
                Some(path.display().to_string())
            }
            Err(err) => {
                warn!("Failed to save crop for {}: {err}", image_path.display());
                None
            }
        }
    } else {
        None
    };

    Ok(InspectionRecord {
        image: image_path.display().to_string(),
        probability: inspection.probability,
        region: [
            inspection.region.x,
            inspection.region.y,
            inspection.region.width,
            inspection.region.height,
        ],
        crop_size: [inspection.crop_size.0, inspection.crop_size.1],
        verdict: verdict_string(&inspection, threshold),
        crop: crop_path,
    })
}

fn verdict_string(inspection: &Inspection, threshold: f32) -> String {
    let label = if inspection.probability >= threshold {
        "issue likely"
    } else {
        "no issue detected"
    };
    format!("{} ({label})", inspection.summary())
}

fn save_crop(
    image: &image::DynamicImage,
    inspection: &Inspection,
    image_path: &Path,
    output_dir: &Path,
) -> Result<PathBuf> {
    let cropped = autoscan_core::crop(image, &inspection.region)
        .context("inspection region no longer maps to a crop")?;

    let stem = image_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("frame");
    let output_path = output_dir.join(format!("{stem}_vehicle.png"));
    cropped
        .save(&output_path)
        .with_context(|| format!("failed to save crop {}", output_path.display()))?;
    Ok(output_path)
}

fn collect_images(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    if !path.is_dir() {
        anyhow::bail!(
            "input path is neither file nor directory: {}",
            path.display()
        );
    }

    let exts = ["jpg", "jpeg", "png", "bmp", "webp"];
    let mut images = Vec::new();
    for entry in WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        if let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) {
            let ext_lower = ext.to_ascii_lowercase();
            if exts.contains(&ext_lower.as_str()) {
                images.push(entry.path().to_path_buf());
            } else {
                debug!("Skipping non-image file {}", entry.path().display());
            }
        }
    }
    images.sort();
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoscan_core::PixelRect;

    fn inspection(probability: f32) -> Inspection {
        Inspection {
            probability,
            region: PixelRect {
                x: 1.0,
                y: 2.0,
                width: 3.0,
                height: 4.0,
            },
            crop_size: (3, 4),
        }
    }

    #[test]
    fn verdict_labels_follow_threshold() {
        assert_eq!(
            verdict_string(&inspection(0.8), 0.5),
            "issue probability 80.0% (issue likely)"
        );
        assert_eq!(
            verdict_string(&inspection(0.2), 0.5),
            "issue probability 20.0% (no issue detected)"
        );
    }

    #[test]
    fn cli_overrides_replace_settings() {
        let mut settings = AppSettings::default();
        let args = InspectArgs::parse_from([
            "autoscan",
            "--input",
            "photo.jpg",
            "--threshold",
            "0.9",
            "--resize-quality",
            "speed",
            "--detector",
            "custom/detector.onnx",
        ]);
        apply_cli_overrides(&mut settings, &args);
        assert_eq!(settings.verdict_threshold, 0.9);
        assert_eq!(
            settings.input.resize_quality,
            autoscan_utils::config::ResizeQuality::Speed
        );
        assert_eq!(
            settings.models.detector,
            PathBuf::from("custom/detector.onnx")
        );
        // Flags left unset keep the settings-file values.
        assert_eq!(
            settings.models.classifier,
            autoscan_utils::config::ModelSettings::default().classifier
        );
    }

    #[test]
    fn settings_file_model_paths_survive_without_cli_flags() {
        let mut settings = AppSettings::default();
        settings.models.detector = PathBuf::from("configured/detector.onnx");
        settings.models.classifier = PathBuf::from("configured/classifier.onnx");
        let args = InspectArgs::parse_from(["autoscan", "--input", "photo.jpg"]);

        apply_cli_overrides(&mut settings, &args);
        assert_eq!(
            settings.models.detector,
            PathBuf::from("configured/detector.onnx")
        );
        assert_eq!(
            settings.models.classifier,
            PathBuf::from("configured/classifier.onnx")
        );
    }

    #[test]
    fn timings_flag_parses() {
        let args = InspectArgs::parse_from(["autoscan", "--input", "photo.jpg", "--timings"]);
        assert!(args.timings);
        let args = InspectArgs::parse_from(["autoscan", "--input", "photo.jpg"]);
        assert!(!args.timings);
    }
}
