use serde::Deserialize;

use super::target::{Scope, Target};

/// One declarative condition to check. Tagged by `kind`; an unrecognized
/// kind deserializes to `Unknown` so a malformed entry fails locally
/// instead of rejecting the whole batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssertionSpec {
    /// Negates a nested assertion.
    Not {
        #[serde(default)]
        assert: Option<Box<AssertionSpec>>,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    /// The foreground window matches the scope filter.
    WindowActive {
        #[serde(default)]
        scope: Option<Scope>,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    ElementExists {
        #[serde(default)]
        target: Option<Target>,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    ElementVisible {
        #[serde(default)]
        target: Option<Target>,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    FocusedControlType {
        #[serde(default)]
        control_type: Option<String>,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    ValueEquals {
        #[serde(default)]
        target: Option<Target>,
        #[serde(default)]
        value: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    ValueContains {
        #[serde(default)]
        target: Option<Target>,
        #[serde(default)]
        value: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    #[serde(other)]
    Unknown,
}

impl AssertionSpec {
    pub fn kind_name(&self) -> &'static str {
        match self {
            AssertionSpec::Not { .. } => "not",
            AssertionSpec::WindowActive { .. } => "window_active",
            AssertionSpec::ElementExists { .. } => "element_exists",
            AssertionSpec::ElementVisible { .. } => "element_visible",
            AssertionSpec::FocusedControlType { .. } => "focused_control_type",
            AssertionSpec::ValueEquals { .. } => "value_equals",
            AssertionSpec::ValueContains { .. } => "value_contains",
            AssertionSpec::Unknown => "unknown",
        }
    }

    /// Polling deadline for this assertion, if the caller set one.
    pub fn timeout_ms(&self) -> Option<u64> {
        match self {
            AssertionSpec::Not { timeout_ms, .. }
            | AssertionSpec::WindowActive { timeout_ms, .. }
            | AssertionSpec::ElementExists { timeout_ms, .. }
            | AssertionSpec::ElementVisible { timeout_ms, .. }
            | AssertionSpec::FocusedControlType { timeout_ms, .. }
            | AssertionSpec::ValueEquals { timeout_ms, .. }
            | AssertionSpec::ValueContains { timeout_ms, .. } => *timeout_ms,
            AssertionSpec::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_kind_becomes_unknown() {
        let spec: AssertionSpec =
            serde_json::from_str(r#"{"kind": "pixel_color", "x": 10}"#).unwrap();
        assert!(matches!(spec, AssertionSpec::Unknown));
    }

    #[test]
    fn test_not_wraps_nested_assertion() {
        let spec: AssertionSpec = serde_json::from_str(
            r#"{"kind": "not", "assert": {"kind": "window_active", "scope": {"title_contains": "Notepad"}}}"#,
        )
        .unwrap();
        match spec {
            AssertionSpec::Not { assert, .. } => {
                let nested = assert.expect("nested assertion");
                assert_eq!(nested.kind_name(), "window_active");
            }
            other => panic!("expected not, got {}", other.kind_name()),
        }
    }
}
