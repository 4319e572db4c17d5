//! Common helpers shared across autoscan crates.

/// Application configuration and settings management.
pub mod config;
/// Image loading, resizing, and tensor-layout conversion.
pub mod image_utils;
/// Instrumentation helpers for optional performance tracing.
pub mod telemetry;

use std::path::Path;

use anyhow::Result;
use log::LevelFilter;

pub use image_utils::{load_image, rgba_to_unit_hwc, stretch_resize};
pub use telemetry::{
    TimingGuard, configure as configure_telemetry, telemetry_allows, timing_guard, timing_guard_if,
};

/// Initialize logging once for CLI environments.
///
/// Respects the `RUST_LOG` environment variable if it is set, otherwise
/// falls back to the provided default filter level.
pub fn init_logging(default_filter: LevelFilter) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter.as_str()),
    );
    builder.filter_module("autoscan::telemetry", LevelFilter::Trace);

    // A failed init means a logger is already installed.
    let _ = builder.try_init();
    Ok(())
}

/// Validate that a path exists and resolve it to an absolute path.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> Result<std::path::PathBuf> {
    let path = path.as_ref();
    anyhow::ensure!(path.exists(), "path does not exist: {}", path.display());
    Ok(path.canonicalize()?)
}
