use crate::error::PilotError;
use crate::models::{SetValueParams, StepTrace};
use crate::resolver::{self, Resolution};

use super::step_trace::StepTraceBuilder;
use super::{fail_step, ActionContext};

/// Resolve the target and write a value into it.
///
/// The direct value accessor is always tried first. Only a failure from
/// that call triggers the clipboard paste fallback; a silent no-op from
/// the provider is taken at its word.
pub async fn set_value(
    ctx: &ActionContext<'_>,
    params: SetValueParams,
) -> Result<StepTrace, PilotError> {
    let mut trace = StepTraceBuilder::new(&params.run_id, &params.step_id);
    match set_value_inner(ctx, &params, &mut trace).await {
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

async fn set_value_inner(
    ctx: &ActionContext<'_>,
    params: &SetValueParams,
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

    if let Err(direct_err) = ctx.provider.set_value(&element, &params.value).await {
        tracing::debug!(
            "direct set_value failed ({direct_err}), falling back to paste"
        );
        ctx.provider.paste_text(&element, &params.value).await?;
    }

    trace.capture_after(params.capture_screenshots, ctx)?;
    Ok(())
}
