//! Selector-ladder resolution with bounded retries.
//!
//! A target names one logical element through an ordered ladder of
//! selector rungs. Rungs are evaluated in declared order: the first rung
//! matching exactly one element wins, a zero-match rung falls through to
//! the next, and a multi-match rung stops the whole resolution because
//! ambiguity reflects the current UI state rather than a transient
//! absence. Only a fully exhausted ladder is worth retrying.

use std::time::{Duration, Instant};

use crate::error::{ErrorData, PilotError};
use crate::models::{MatchAttempt, ResolvedElement, RetryPolicy, Rung, RungKind, Target};
use crate::provider::{AutomationProvider, ElementId};

/// A successful resolution: the winning rung's snapshot, the live element
/// id for follow-up actions, and every attempt made along the way.
#[derive(Debug)]
pub struct Resolution {
    pub resolved: ResolvedElement,
    pub element: ElementId,
    pub attempts: Vec<MatchAttempt>,
}

/// Outcome of evaluating one rung against the current UI state.
enum RungOutcome {
    Matched(ElementId),
    Empty { error: Option<String> },
    Ambiguous { count: usize },
    Unavailable,
}

enum PassResult {
    Matched(ResolvedElement, ElementId),
    NotFound,
    Ambiguous,
    Unavailable,
}

struct Pass {
    attempts: Vec<MatchAttempt>,
    result: PassResult,
}

/// Resolve `target` to exactly one live element.
///
/// Retries apply only to a fully exhausted ladder; ambiguity and the
/// absolute timeout are terminal. Attempts from every pass are
/// concatenated in order onto the result or the error payload.
pub async fn resolve(
    provider: &dyn AutomationProvider,
    target: &Target,
    retry: Option<&RetryPolicy>,
    timeout_ms: Option<u64>,
) -> Result<Resolution, PilotError> {
    if target.ladder.is_empty() {
        return Err(PilotError::empty_ladder());
    }

    let policy = retry.cloned().unwrap_or_default();
    let total_passes = 1 + policy.extra_attempts;
    let started = Instant::now();
    let mut attempts: Vec<MatchAttempt> = Vec::new();

    for pass_index in 0..total_passes {
        if let Some(limit) = timeout_ms {
            if started.elapsed() > Duration::from_millis(limit) {
                return Err(PilotError::Timeout {
                    data: ErrorData::with_attempts(attempts),
                });
            }
        }

        let mut pass = resolve_once(provider, target).await?;
        attempts.append(&mut pass.attempts);

        match pass.result {
            PassResult::Matched(resolved, element) => {
                return Ok(Resolution {
                    resolved,
                    element,
                    attempts,
                });
            }
            PassResult::Ambiguous => {
                return Err(PilotError::AmbiguousMatch {
                    data: ErrorData::with_attempts(attempts),
                });
            }
            PassResult::Unavailable => {
                return Err(PilotError::VisualAnchorUnavailable {
                    data: ErrorData::with_attempts(attempts),
                });
            }
            PassResult::NotFound => {
                if pass_index + 1 < total_passes && policy.wait_ms > 0 {
                    let delay = policy.backoff.delay(policy.wait_ms, pass_index);
                    tracing::debug!(
                        "ladder exhausted on pass {}, retrying in {:?}",
                        pass_index + 1,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    Err(PilotError::element_not_found(attempts))
}

/// One pass over the whole ladder.
async fn resolve_once(
    provider: &dyn AutomationProvider,
    target: &Target,
) -> Result<Pass, PilotError> {
    let root = provider
        .scope_root(target.scope.as_ref())
        .await?
        .ok_or_else(PilotError::scope_not_found)?;

    let mut attempts = Vec::with_capacity(target.ladder.len());

    for (index, rung) in target.ladder.iter().enumerate() {
        let rung_started = Instant::now();
        let outcome = evaluate_rung(provider, &root, rung).await;
        let duration_ms = rung_started.elapsed().as_millis() as u64;

        let (matched_count, ok, error) = match &outcome {
            RungOutcome::Matched(_) => (1, true, None),
            RungOutcome::Empty { error } => (0, false, error.clone()),
            RungOutcome::Ambiguous { count } => (*count, false, None),
            RungOutcome::Unavailable => (
                0,
                false,
                Some("Visual anchor matching is unavailable".to_string()),
            ),
        };
        attempts.push(MatchAttempt {
            rung_index: index,
            kind: rung.kind,
            matched_count,
            duration_ms,
            ok,
            error,
        });

        match outcome {
            RungOutcome::Matched(element) => {
                tracing::debug!("rung {} ({}) matched {}", index, rung.kind.as_str(), element);
                let descriptor = provider.describe(&element).await?;
                let resolved = ResolvedElement {
                    rung_index: index,
                    kind: rung.kind,
                    element: descriptor,
                };
                return Ok(Pass {
                    attempts,
                    result: PassResult::Matched(resolved, element),
                });
            }
            RungOutcome::Empty { .. } => continue,
            RungOutcome::Ambiguous { .. } => {
                return Ok(Pass {
                    attempts,
                    result: PassResult::Ambiguous,
                })
            }
            RungOutcome::Unavailable => {
                return Ok(Pass {
                    attempts,
                    result: PassResult::Unavailable,
                })
            }
        }
    }

    Ok(Pass {
        attempts,
        result: PassResult::NotFound,
    })
}

async fn evaluate_rung(
    provider: &dyn AutomationProvider,
    root: &ElementId,
    rung: &Rung,
) -> RungOutcome {
    let found = match rung.kind {
        RungKind::Attr => provider.find_by_attributes(root, &rung.selector).await,
        RungKind::NearLabel => provider.find_near_label(root, &rung.selector).await,
        // A capability gap fails the resolution outright; it is not a
        // zero-match that a later rung could paper over.
        RungKind::VisualAnchor => return RungOutcome::Unavailable,
        RungKind::Coords => {
            return RungOutcome::Empty {
                error: Some("Coordinate selectors are not supported".to_string()),
            }
        }
    };

    match found {
        Ok(mut matched) => match matched.len() {
            0 => RungOutcome::Empty { error: None },
            1 => RungOutcome::Matched(matched.remove(0)),
            count => RungOutcome::Ambiguous { count },
        },
        // One broken strategy must not mask a later working one
        Err(e) => RungOutcome::Empty {
            error: Some(e.to_string()),
        },
    }
}
