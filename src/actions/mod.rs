//! Trace-wrapped action executors.
//!
//! Every executor follows the same shape: build a step trace, resolve the
//! target through the selector ladder, perform one post-resolution
//! operation, and return the finished trace. Failures leave through
//! [`fail_step`], which coerces anything unexpected to `ActionFailed` and
//! attaches the finished trace to the error payload.

pub mod step_trace;

mod click;
mod extract;
mod focus;
mod paste_text;
mod screenshot;
mod set_value;

pub use click::click;
pub use extract::get_value;
pub use focus::focus_window;
pub use paste_text::paste_text;
pub use screenshot::capture_artifact;
pub use set_value::set_value;

use std::path::Path;

use crate::error::PilotError;
use crate::provider::AutomationProvider;
use crate::artifacts::ScreenCapture;
use crate::runs::RunRegistry;

use step_trace::StepTraceBuilder;

/// Capabilities and shared state every executor needs.
pub struct ActionContext<'a> {
    pub provider: &'a dyn AutomationProvider,
    pub capture: &'a dyn ScreenCapture,
    pub runs: &'a RunRegistry,
    /// Fallback artifact directory for steps outside a registered run.
    pub artifact_root: &'a Path,
}

/// Normalize a failure at the action boundary.
///
/// Unexpected errors become `ActionFailed` so the RPC layer always sees a
/// typed, coded error. The trace inherits the error message and code, and
/// the finished trace rides along on the error payload so the caller can
/// reconstruct the step without re-running it.
pub(crate) fn fail_step(mut builder: StepTraceBuilder, err: PilotError) -> PilotError {
    let mut err = match err {
        PilotError::Internal(source) => PilotError::action_failed(source.to_string()),
        other => other,
    };

    if builder.match_attempts.is_empty() {
        if let Some(data) = err.data() {
            builder.match_attempts = data.match_attempts.clone();
        }
    }
    builder.error = Some(err.to_string());
    builder.error_code = Some(err.code());

    let finished = builder.finish();
    if let Some(data) = err.data_mut() {
        data.trace = Some(Box::new(finished));
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes;

    #[test]
    fn test_fail_step_coerces_internal_to_action_failed() {
        let builder = StepTraceBuilder::new("r1", "s1");
        let err = fail_step(builder, PilotError::Internal(anyhow::anyhow!("boom")));

        assert_eq!(err.code(), codes::ACTION_FAILED);
        let trace = err.data().unwrap().trace.as_ref().unwrap();
        assert_eq!(trace.error.as_deref(), Some("boom"));
        assert_eq!(trace.error_code, Some(codes::ACTION_FAILED));
        assert!(!trace.ok);
    }

    #[test]
    fn test_fail_step_copies_attempts_onto_trace() {
        let builder = StepTraceBuilder::new("r1", "s1");
        let err = fail_step(
            builder,
            PilotError::element_not_found(vec![crate::models::MatchAttempt {
                rung_index: 0,
                kind: crate::models::RungKind::Attr,
                matched_count: 0,
                duration_ms: 1,
                ok: false,
                error: None,
            }]),
        );

        assert_eq!(err.code(), codes::ELEMENT_NOT_FOUND);
        let data = err.data().unwrap();
        let trace = data.trace.as_ref().unwrap();
        assert_eq!(trace.match_attempts.len(), 1);
        assert_eq!(data.match_attempts.len(), 1);
    }
}
