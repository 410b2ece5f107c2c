//! Declarative assertion evaluation.
//!
//! Every assertion in a batch is evaluated, even after earlier failures,
//! so one call surfaces every failing condition. Evaluation is total: a
//! resolution failure, a missing field, or an unrecognized kind becomes a
//! local `ok = false` outcome rather than an error, which also gives
//! `not` something sane to negate.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

use crate::actions::step_trace::StepTraceBuilder;
use crate::actions::{fail_step, ActionContext};
use crate::error::{ErrorData, PilotError};
use crate::models::{
    AssertParams, AssertionFailure, AssertionSpec, MatchAttempt, StepTrace, Target,
};
use crate::provider::{AutomationProvider, ElementId};
use crate::resolver;

/// Result of evaluating one assertion once.
struct Outcome {
    ok: bool,
    message: String,
    attempts: Vec<MatchAttempt>,
}

impl Outcome {
    fn pass() -> Self {
        Self {
            ok: true,
            message: String::new(),
            attempts: Vec::new(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            attempts: Vec::new(),
        }
    }

    fn with_attempts(mut self, attempts: Vec<MatchAttempt>) -> Self {
        self.attempts = attempts;
        self
    }
}

/// Evaluate a batch of assertions against the current UI state.
///
/// Assertions with a timeout poll independently at `poll_interval` until
/// they pass or the deadline lapses. On any failure the call fails
/// `AssertionFailed` with one entry per failed assertion and the merged
/// attempt trail from every sub-resolution.
pub async fn check(
    ctx: &ActionContext<'_>,
    params: AssertParams,
    poll_interval: Duration,
) -> Result<StepTrace, PilotError> {
    let mut trace = StepTraceBuilder::new(&params.run_id, &params.step_id);
    let mut failed = Vec::new();

    for (index, spec) in params.assertions.iter().enumerate() {
        let outcome = evaluate_with_timeout(ctx.provider, spec, poll_interval).await;
        trace.match_attempts.extend(outcome.attempts);
        if !outcome.ok {
            tracing::debug!(
                "assertion {} ({}) failed: {}",
                index,
                spec.kind_name(),
                outcome.message
            );
            failed.push(AssertionFailure {
                index,
                kind: spec.kind_name().to_string(),
                message: outcome.message,
            });
        }
    }

    if failed.is_empty() {
        trace.ok = true;
        return Ok(trace.finish());
    }

    trace.failed = failed.clone();
    let err = PilotError::AssertionFailed {
        data: ErrorData {
            failed,
            ..Default::default()
        },
    };
    Err(fail_step(trace, err))
}

/// Re-evaluate until the assertion passes or its deadline lapses.
async fn evaluate_with_timeout(
    provider: &dyn AutomationProvider,
    spec: &AssertionSpec,
    poll_interval: Duration,
) -> Outcome {
    let deadline = spec
        .timeout_ms()
        .map(|ms| Instant::now() + Duration::from_millis(ms));
    let mut attempts = Vec::new();

    loop {
        let mut outcome = evaluate_once(provider, spec).await;
        attempts.append(&mut outcome.attempts);

        let keep_polling = !outcome.ok
            && deadline.is_some_and(|deadline| Instant::now() < deadline);
        if !keep_polling {
            return Outcome {
                ok: outcome.ok,
                message: outcome.message,
                attempts,
            };
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// One evaluation of one assertion. Boxed because `not` recurses.
fn evaluate_once<'a>(
    provider: &'a dyn AutomationProvider,
    spec: &'a AssertionSpec,
) -> Pin<Box<dyn Future<Output = Outcome> + Send + 'a>> {
    Box::pin(async move {
        match spec {
            AssertionSpec::Not { assert, .. } => {
                let Some(nested) = assert else {
                    return Outcome::fail("Missing nested assertion for not");
                };
                let nested_outcome = evaluate_once(provider, nested).await;
                Outcome {
                    ok: !nested_outcome.ok,
                    message: if nested_outcome.ok {
                        "Negated assertion passed".to_string()
                    } else {
                        String::new()
                    },
                    attempts: nested_outcome.attempts,
                }
            }

            AssertionSpec::WindowActive { scope, .. } => {
                match provider.active_window().await {
                    Err(e) => Outcome::fail(e.to_string()),
                    Ok(None) => Outcome::fail("No active window"),
                    Ok(Some(window)) => match scope {
                        Some(scope) if !scope.matches(&window) => {
                            Outcome::fail("Active window did not match scope")
                        }
                        _ => Outcome::pass(),
                    },
                }
            }

            AssertionSpec::ElementExists { target, .. } => {
                let Some(target) = target else {
                    return Outcome::fail("Missing target for element assertion");
                };
                let (attempts, resolved) = resolve_target(provider, target).await;
                match resolved {
                    Ok(_) => Outcome::pass().with_attempts(attempts),
                    Err(message) => Outcome::fail(message).with_attempts(attempts),
                }
            }

            AssertionSpec::ElementVisible { target, .. } => {
                let Some(target) = target else {
                    return Outcome::fail("Missing target for element assertion");
                };
                let (attempts, resolved) = resolve_target(provider, target).await;
                let element = match resolved {
                    Ok(element) => element,
                    Err(message) => return Outcome::fail(message).with_attempts(attempts),
                };
                match provider.is_visible(&element).await {
                    Err(e) => Outcome::fail(e.to_string()).with_attempts(attempts),
                    Ok(false) => Outcome::fail("Element not visible").with_attempts(attempts),
                    Ok(true) => match provider.bounding_rect(&element).await {
                        Ok(Some(rect)) if !rect.is_visible() => {
                            Outcome::fail("Element has a degenerate bounding rect")
                                .with_attempts(attempts)
                        }
                        _ => Outcome::pass().with_attempts(attempts),
                    },
                }
            }

            AssertionSpec::FocusedControlType { control_type, .. } => {
                let Some(expected) = control_type else {
                    return Outcome::fail("Missing control_type for focus assertion");
                };
                match provider.focused_control_type().await {
                    Err(e) => Outcome::fail(e.to_string()),
                    Ok(focused) => {
                        if focused.as_deref() == Some(expected.as_str()) {
                            Outcome::pass()
                        } else {
                            Outcome::fail(format!(
                                "Focused control type mismatch (expected {}, got {})",
                                expected,
                                focused.as_deref().unwrap_or("none")
                            ))
                        }
                    }
                }
            }

            AssertionSpec::ValueEquals { target, value, .. } => {
                value_assertion(provider, target.as_ref(), value, true).await
            }

            AssertionSpec::ValueContains { target, value, .. } => {
                value_assertion(provider, target.as_ref(), value, false).await
            }

            AssertionSpec::Unknown => Outcome::fail("Unsupported assertion kind"),
        }
    })
}

async fn value_assertion(
    provider: &dyn AutomationProvider,
    target: Option<&Target>,
    expected: &str,
    exact: bool,
) -> Outcome {
    let Some(target) = target else {
        return Outcome::fail("Missing target for value assertion");
    };
    let (attempts, resolved) = resolve_target(provider, target).await;
    let element = match resolved {
        Ok(element) => element,
        Err(message) => return Outcome::fail(message).with_attempts(attempts),
    };
    let value = match provider.get_value(&element).await {
        Ok(value) => value,
        Err(e) => return Outcome::fail(e.to_string()).with_attempts(attempts),
    };

    if exact && value != expected {
        Outcome::fail(format!(
            "Value mismatch (expected {expected}, got {value})"
        ))
        .with_attempts(attempts)
    } else if !exact && !value.contains(expected) {
        Outcome::fail(format!("Value did not contain {expected}")).with_attempts(attempts)
    } else {
        Outcome::pass().with_attempts(attempts)
    }
}

/// Single-pass resolution for an assertion. Failures fold into a message
/// so the assertion stays a local pass/fail, and the attempt trail is
/// preserved either way.
async fn resolve_target(
    provider: &dyn AutomationProvider,
    target: &Target,
) -> (Vec<MatchAttempt>, Result<ElementId, String>) {
    match resolver::resolve(provider, target, None, None).await {
        Ok(resolution) => (resolution.attempts, Ok(resolution.element)),
        Err(err) => {
            let attempts = err
                .data()
                .map(|data| data.match_attempts.clone())
                .unwrap_or_default();
            (attempts, Err(err.to_string()))
        }
    }
}
