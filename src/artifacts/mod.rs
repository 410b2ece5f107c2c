//! Screen capture capability, backed by xcap.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use xcap::{Monitor, Window};

/// What a screenshot covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    Screen,
    #[default]
    ActiveWindow,
}

/// Screenshot capability consumed by the step tracer and the ad-hoc
/// screenshot handler.
pub trait ScreenCapture: Send + Sync {
    /// Capture one image, store it as `name` under `dir`, and return the
    /// stored path. The directory is created if missing.
    fn capture(&self, name: &str, dir: &Path, mode: CaptureMode) -> Result<PathBuf>;

    /// Whether capture can work in this process.
    fn is_supported(&self) -> bool {
        true
    }
}

/// Cross-platform capture via xcap.
pub struct XcapCapture;

impl ScreenCapture for XcapCapture {
    fn capture(&self, name: &str, dir: &Path, mode: CaptureMode) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .map_err(|e| anyhow!("Failed to create artifact dir {}: {}", dir.display(), e))?;
        let path = dir.join(name);

        let image = match mode {
            CaptureMode::Screen => capture_primary_screen()?,
            CaptureMode::ActiveWindow => capture_foreground_window()?,
        };
        image
            .save(&path)
            .map_err(|e| anyhow!("Failed to write screenshot {}: {}", path.display(), e))?;
        Ok(path)
    }
}

fn capture_primary_screen() -> Result<RgbaImage> {
    let monitors = Monitor::all().map_err(|e| anyhow!("Failed to get monitors: {}", e))?;

    let primary = monitors
        .into_iter()
        .find(|m| m.is_primary())
        .ok_or_else(|| anyhow!("No primary monitor found"))?;

    primary
        .capture_image()
        .map_err(|e| anyhow!("Failed to capture screen: {}", e))
}

fn capture_foreground_window() -> Result<RgbaImage> {
    let windows = Window::all().map_err(|e| anyhow!("Failed to get windows: {}", e))?;

    // xcap exposes no z-order or focus flag; the first visible titled
    // window is the foreground one on the platforms we target
    let window = windows
        .into_iter()
        .find(|w| !w.title().is_empty() && !w.is_minimized())
        .ok_or_else(|| anyhow!("No visible window to capture"))?;

    window
        .capture_image()
        .map_err(|e| anyhow!("Failed to capture window: {}", e))
}
