use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::element::WindowDescriptor;

/// Filter narrowing which top-level window a search starts under.
///
/// All fields are optional; an absent field always matches. Title and
/// process match as case-insensitive substrings, the window class as a
/// case-insensitive exact string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_contains: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
}

impl Scope {
    /// Whether a window satisfies this filter.
    pub fn matches(&self, window: &WindowDescriptor) -> bool {
        if let Some(title) = &self.title_contains {
            if !window
                .title
                .to_lowercase()
                .contains(&title.to_lowercase())
            {
                return false;
            }
        }
        if let Some(class) = &self.window_class {
            match &window.window_class {
                Some(window_class) if window_class.eq_ignore_ascii_case(class) => {}
                _ => return false,
            }
        }
        if let Some(process) = &self.process_name {
            match &window.process_name {
                Some(name) if name.to_lowercase().contains(&process.to_lowercase()) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Selector strategy for one rung of a ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RungKind {
    /// Structural attribute match (automation id, name, control type, class).
    Attr,
    /// Spatial proximity to a text label.
    NearLabel,
    /// Visual anchor matching; not available in this build.
    VisualAnchor,
    /// Raw coordinates; recognized but unsupported.
    Coords,
}

impl RungKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RungKind::Attr => "attr",
            RungKind::NearLabel => "near_label",
            RungKind::VisualAnchor => "visual_anchor",
            RungKind::Coords => "coords",
        }
    }
}

/// Direction constraint for near-label matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    RightOf,
    LeftOf,
    Above,
    Below,
}

/// Parameters for a rung's element query. Which fields apply depends on
/// the rung kind; unused fields are ignored by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Label text to anchor a near-label search on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default = "default_max_distance_px")]
    pub max_distance_px: u32,
    /// Absent means any direction within `max_distance_px`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

fn default_max_distance_px() -> u32 {
    120
}

impl Default for SelectorParams {
    fn default() -> Self {
        Self {
            control_type: None,
            automation_id: None,
            name: None,
            class_name: None,
            label: None,
            max_distance_px: default_max_distance_px(),
            direction: None,
        }
    }
}

/// One selector strategy within a ladder, tried in declared order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rung {
    pub kind: RungKind,
    #[serde(default)]
    pub selector: SelectorParams,
    /// Informational weight only; never used for tie-breaking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// One logical target element: an optional window scope plus an ordered
/// list of rungs, from most to least reliable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    pub ladder: Vec<Rung>,
}

/// Wait growth between resolution passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backoff {
    #[default]
    None,
    Linear,
    Exponential,
}

impl Backoff {
    /// Delay before the retry following zero-based pass `pass_index`.
    pub fn delay(&self, wait_ms: u64, pass_index: u32) -> Duration {
        let ms = match self {
            Backoff::None => wait_ms,
            Backoff::Linear => wait_ms.saturating_mul(pass_index as u64 + 1),
            Backoff::Exponential => wait_ms.saturating_mul(2u64.saturating_pow(pass_index)),
        };
        Duration::from_millis(ms)
    }
}

/// Retry behavior for a resolution. `extra_attempts` counts passes beyond
/// the first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub extra_attempts: u32,
    pub wait_ms: u64,
    pub backoff: Backoff,
}
