use crate::error::PilotError;
use crate::models::{PasteTextParams, StepTrace};
use crate::resolver::{self, Resolution};

use super::step_trace::StepTraceBuilder;
use super::{fail_step, ActionContext};

/// Resolve the target and paste text into it through the clipboard.
pub async fn paste_text(
    ctx: &ActionContext<'_>,
    params: PasteTextParams,
) -> Result<StepTrace, PilotError> {
    let mut trace = StepTraceBuilder::new(&params.run_id, &params.step_id);
    match paste_inner(ctx, &params, &mut trace).await {
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

async fn paste_inner(
    ctx: &ActionContext<'_>,
    params: &PasteTextParams,
    trace: &mut StepTraceBuilder,
) -> Result<(), PilotError> {
    trace.capture_before(params.capture_screenshots, ctx)?;

    let Resolution {
        resolved,
        element,
        attempts,
    } = resolver::resolve(
        ctx.provider,
        &params.target,
        params.retry.as_ref(),
        params.timeout_ms,
    )
    .await?;
    trace.match_attempts = attempts;
    trace.resolved = Some(resolved);

    ctx.provider.paste_text(&element, &params.text).await?;

    trace.capture_after(params.capture_screenshots, ctx)?;
    Ok(())
}
