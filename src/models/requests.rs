use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::assertions::AssertionSpec;
use super::target::{RetryPolicy, Scope, Target};
use crate::artifacts::CaptureMode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn as_str(&self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Right => "right",
            MouseButton::Middle => "middle",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RunBeginParams {
    pub run_id: String,
    pub artifact_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct RunEndParams {
    pub run_id: String,
}

#[derive(Debug, Deserialize)]
pub struct FocusParams {
    pub run_id: String,
    pub step_id: String,
    pub scope: Scope,
    #[serde(default)]
    pub capture_screenshots: bool,
}

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    pub target: Target,
    #[serde(default)]
    pub retry: Option<RetryPolicy>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ClickParams {
    pub run_id: String,
    pub step_id: String,
    pub target: Target,
    #[serde(default)]
    pub retry: Option<RetryPolicy>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub button: MouseButton,
    #[serde(default = "default_clicks")]
    pub clicks: u8,
    #[serde(default)]
    pub capture_screenshots: bool,
}

fn default_clicks() -> u8 {
    1
}

#[derive(Debug, Deserialize)]
pub struct SetValueParams {
    pub run_id: String,
    pub step_id: String,
    pub target: Target,
    pub value: String,
    #[serde(default)]
    pub retry: Option<RetryPolicy>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub capture_screenshots: bool,
}

#[derive(Debug, Deserialize)]
pub struct PasteTextParams {
    pub run_id: String,
    pub step_id: String,
    pub target: Target,
    pub text: String,
    #[serde(default)]
    pub retry: Option<RetryPolicy>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub capture_screenshots: bool,
}

#[derive(Debug, Deserialize)]
pub struct ExtractParams {
    pub run_id: String,
    pub step_id: String,
    pub target: Target,
    #[serde(default)]
    pub retry: Option<RetryPolicy>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AssertParams {
    pub run_id: String,
    pub step_id: String,
    #[serde(default)]
    pub assertions: Vec<AssertionSpec>,
}

#[derive(Debug, Deserialize)]
pub struct ScreenshotParams {
    pub run_id: String,
    pub step_id: String,
    pub name: String,
    #[serde(default)]
    pub mode: CaptureMode,
}
