use crate::error::PilotError;
use crate::models::{ExtractParams, StepTrace};
use crate::resolver::{self, Resolution};

use super::step_trace::StepTraceBuilder;
use super::{fail_step, ActionContext};

/// Resolve the target and read its exposed value onto the trace.
pub async fn get_value(
    ctx: &ActionContext<'_>,
    params: ExtractParams,
) -> Result<StepTrace, PilotError> {
    let mut trace = StepTraceBuilder::new(&params.run_id, &params.step_id);
    match extract_inner(ctx, &params, &mut trace).await {
        Ok(()) => {
            trace.ok = true;
            Ok(trace.finish())
        }
        Err(err) => Err(fail_step(trace, err)),
    }
}

async fn extract_inner(
    ctx: &ActionContext<'_>,
    params: &ExtractParams,
    trace: &mut StepTraceBuilder,
) -> Result<(), PilotError> {
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

    let value = ctx.provider.get_value(&element).await?;
    trace.value = Some(value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Rung, RungKind, SelectorParams, Target};
    use crate::runs::RunRegistry;
    use crate::testutil::{FakeCapture, FakeProvider};

    #[tokio::test]
    async fn test_extract_records_value_on_trace() {
        let provider = FakeProvider::default()
            .with_matches("edit", vec!["el-1"])
            .with_value("el-1", "extracted");
        let runs = RunRegistry::new();
        let ctx = ActionContext {
            provider: &provider,
            capture: &FakeCapture,
            runs: &runs,
            artifact_root: std::path::Path::new("artifacts"),
        };

        let trace = get_value(
            &ctx,
            ExtractParams {
                run_id: "run".to_string(),
                step_id: "step".to_string(),
                target: Target {
                    scope: None,
                    ladder: vec![Rung {
                        kind: RungKind::Attr,
                        selector: SelectorParams {
                            name: Some("edit".to_string()),
                            ..Default::default()
                        },
                        confidence: None,
                    }],
                },
                retry: None,
                timeout_ms: None,
            },
        )
        .await
        .unwrap();

        assert!(trace.ok);
        assert_eq!(trace.value.as_deref(), Some("extracted"));
    }
}
