use crate::error::PilotError;
use crate::models::{FocusParams, StepTrace};

use super::step_trace::StepTraceBuilder;
use super::{fail_step, ActionContext};

/// Bring the first window matching the scope to the foreground.
pub async fn focus_window(
    ctx: &ActionContext<'_>,
    params: FocusParams,
) -> Result<StepTrace, PilotError> {
    let mut trace = StepTraceBuilder::new(&params.run_id, &params.step_id);
    match focus_inner(ctx, &params, &mut trace).await {
        Ok(()) => {
            trace.ok = true;
            Ok(trace.finish())
        }
        Err(err) => {
            if let Err(capture_err) = trace.capture_after(params.capture_screenshots, ctx) {
                tracing::warn!(
                    "after-screenshot failed on failing step {}: {}",
                    params.step_id,
                    capture_err
                );
            }
            Err(fail_step(trace, err))
        }
    }
}

async fn focus_inner(
    ctx: &ActionContext<'_>,
    params: &FocusParams,
    trace: &mut StepTraceBuilder,
) -> Result<(), PilotError> {
    trace.capture_before(params.capture_screenshots, ctx)?;

    let window = ctx
        .provider
        .focus_window(&params.scope)
        .await?
        .ok_or_else(PilotError::scope_not_found)?;
    tracing::debug!("focused window {} ({})", window.id, window.title);
    trace.window = Some(window);

    trace.capture_after(params.capture_screenshots, ctx)?;
    Ok(())
}
