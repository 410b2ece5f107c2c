use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::element::{ElementDescriptor, WindowDescriptor};
use super::target::RungKind;

/// One rung evaluation within a resolution pass. Records are append-only;
/// nothing mutates an attempt after it is pushed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchAttempt {
    pub rung_index: usize,
    pub kind: RungKind,
    pub matched_count: usize,
    pub duration_ms: u64,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The rung that won a resolution plus a snapshot of the element it found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedElement {
    pub rung_index: usize,
    pub kind: RungKind,
    pub element: ElementDescriptor,
}

/// One failed assertion within a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionFailure {
    pub index: usize,
    pub kind: String,
    pub message: String,
}

/// Immutable record of one operation: what was attempted, what resolved,
/// and how it ended. The service never stores these; the caller owns them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepTrace {
    pub run_id: String,
    pub step_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub ok: bool,
    pub match_attempts: Vec<MatchAttempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedElement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<AssertionFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_screenshot_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_screenshot_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_serializes_only_populated_optionals() {
        let trace = StepTrace {
            run_id: "r1".to_string(),
            step_id: "s1".to_string(),
            started_at: Utc::now(),
            ended_at: Utc::now(),
            ok: true,
            match_attempts: vec![],
            resolved: None,
            value: None,
            window: None,
            failed: vec![],
            before_screenshot_path: None,
            after_screenshot_path: None,
            screenshot_path: None,
            error: None,
            error_code: None,
        };
        let json = serde_json::to_value(&trace).unwrap();
        let object = json.as_object().unwrap();
        assert!(object.contains_key("match_attempts"));
        assert!(!object.contains_key("resolved"));
        assert!(!object.contains_key("failed"));
        assert!(!object.contains_key("error"));
        assert!(!object.contains_key("before_screenshot_path"));
    }
}
