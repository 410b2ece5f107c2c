use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::artifacts::CaptureMode;
use crate::error::PilotError;
use crate::models::{
    AssertionFailure, MatchAttempt, ResolvedElement, StepTrace, WindowDescriptor,
};

use super::ActionContext;

/// Accumulates everything observable about one operation; `finish()`
/// freezes it into the immutable [`StepTrace`] record.
#[derive(Debug)]
pub struct StepTraceBuilder {
    pub run_id: String,
    pub step_id: String,
    started_at: DateTime<Utc>,
    pub ok: bool,
    pub match_attempts: Vec<MatchAttempt>,
    pub resolved: Option<ResolvedElement>,
    pub value: Option<String>,
    pub window: Option<WindowDescriptor>,
    pub failed: Vec<AssertionFailure>,
    pub before_screenshot_path: Option<PathBuf>,
    pub after_screenshot_path: Option<PathBuf>,
    pub screenshot_path: Option<PathBuf>,
    pub error: Option<String>,
    pub error_code: Option<i64>,
}

impl StepTraceBuilder {
    pub fn new(run_id: &str, step_id: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            step_id: step_id.to_string(),
            started_at: Utc::now(),
            ok: false,
            match_attempts: Vec::new(),
            resolved: None,
            value: None,
            window: None,
            failed: Vec::new(),
            before_screenshot_path: None,
            after_screenshot_path: None,
            screenshot_path: None,
            error: None,
            error_code: None,
        }
    }

    /// Screenshot taken before the action body runs. A capture failure is
    /// the operation's own failure; a half-missing before/after pair would
    /// mislead whoever replays the trace.
    pub fn capture_before(
        &mut self,
        enabled: bool,
        ctx: &ActionContext<'_>,
    ) -> Result<(), PilotError> {
        if !enabled || self.before_screenshot_path.is_some() {
            return Ok(());
        }
        self.before_screenshot_path = Some(self.capture_step_image(ctx, "before")?);
        Ok(())
    }

    /// Screenshot taken after the action body ran. Idempotent, so the
    /// failure path can call it again without clobbering an earlier shot.
    pub fn capture_after(
        &mut self,
        enabled: bool,
        ctx: &ActionContext<'_>,
    ) -> Result<(), PilotError> {
        if !enabled || self.after_screenshot_path.is_some() {
            return Ok(());
        }
        self.after_screenshot_path = Some(self.capture_step_image(ctx, "after")?);
        Ok(())
    }

    fn capture_step_image(
        &self,
        ctx: &ActionContext<'_>,
        suffix: &str,
    ) -> Result<PathBuf, PilotError> {
        let dir = ctx
            .runs
            .artifact_dir(&self.run_id)
            .unwrap_or_else(|| ctx.artifact_root.to_path_buf());
        let name = format!("{}_{}.png", self.step_id, suffix);
        Ok(ctx.capture.capture(&name, &dir, CaptureMode::ActiveWindow)?)
    }

    pub fn finish(self) -> StepTrace {
        StepTrace {
            run_id: self.run_id,
            step_id: self.step_id,
            started_at: self.started_at,
            ended_at: Utc::now(),
            ok: self.ok,
            match_attempts: self.match_attempts,
            resolved: self.resolved,
            value: self.value,
            window: self.window,
            failed: self.failed,
            before_screenshot_path: self.before_screenshot_path,
            after_screenshot_path: self.after_screenshot_path,
            screenshot_path: self.screenshot_path,
            error: self.error,
            error_code: self.error_code,
        }
    }
}
