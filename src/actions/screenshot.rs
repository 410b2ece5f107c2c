use std::path::Path;

use crate::artifacts::ScreenCapture;
use crate::error::PilotError;
use crate::models::{ScreenshotParams, StepTrace};
use crate::runs::RunRegistry;

use super::fail_step;
use super::step_trace::StepTraceBuilder;

/// Ad-hoc named screenshot into the owning run's artifact directory.
///
/// This is the one step-scoped operation that works without an automation
/// provider, so it takes the capture capability directly.
pub async fn capture_artifact(
    capture: &dyn ScreenCapture,
    runs: &RunRegistry,
    artifact_root: &Path,
    params: ScreenshotParams,
) -> Result<StepTrace, PilotError> {
    let mut trace = StepTraceBuilder::new(&params.run_id, &params.step_id);

    let dir = runs
        .artifact_dir(&params.run_id)
        .unwrap_or_else(|| artifact_root.to_path_buf());

    match capture.capture(&params.name, &dir, params.mode) {
        Ok(path) => {
            tracing::debug!("stored screenshot {}", path.display());
            trace.screenshot_path = Some(path);
            trace.ok = true;
            Ok(trace.finish())
        }
        Err(err) => Err(fail_step(trace, PilotError::Internal(err))),
    }
}
