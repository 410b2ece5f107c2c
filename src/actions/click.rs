use crate::error::PilotError;
use crate::models::{ClickParams, StepTrace};
use crate::resolver::{self, Resolution};

use super::step_trace::StepTraceBuilder;
use super::{fail_step, ActionContext};

/// Resolve the target and issue an n-click gesture.
pub async fn click(ctx: &ActionContext<'_>, params: ClickParams) -> Result<StepTrace, PilotError> {
    let mut trace = StepTraceBuilder::new(&params.run_id, &params.step_id);
    match click_inner(ctx, &params, &mut trace).await {
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

async fn click_inner(
    ctx: &ActionContext<'_>,
    params: &ClickParams,
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

    match params.clicks {
        1 => ctx.provider.click(&element, params.button, false).await?,
        2 => ctx.provider.click(&element, params.button, true).await?,
        // No native triple-click primitive; a double followed by a single
        // lands as three clicks inside the multi-click window.
        3 => {
            ctx.provider.click(&element, params.button, true).await?;
            ctx.provider.click(&element, params.button, false).await?;
        }
        other => {
            return Err(PilotError::action_failed(format!(
                "Unsupported click count: {other}"
            )))
        }
    }

    trace.capture_after(params.capture_screenshots, ctx)?;
    Ok(())
}
