use serde::Serialize;
use thiserror::Error;

use crate::models::{AssertionFailure, MatchAttempt, StepTrace};

/// Stable numeric error codes carried in RPC error envelopes.
///
/// Negative codes are protocol-level (JSON-RPC reserved range); positive
/// codes are domain-level and never overlap with them.
pub mod codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    pub const SCOPE_NOT_FOUND: i64 = 1000;
    pub const ELEMENT_NOT_FOUND: i64 = 1001;
    pub const AMBIGUOUS_MATCH: i64 = 1002;
    pub const ACTION_FAILED: i64 = 1003;
    pub const ASSERTION_FAILED: i64 = 1004;
    pub const TIMEOUT: i64 = 1005;
    pub const VISUAL_ANCHOR_UNAVAILABLE: i64 = 1006;
}

/// Structured payload attached to domain errors: the attempt trail from a
/// failed resolution, the finished step trace, and failed assertions.
#[derive(Debug, Default, Serialize)]
pub struct ErrorData {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub match_attempts: Vec<MatchAttempt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Box<StepTrace>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<AssertionFailure>,
}

impl ErrorData {
    pub fn with_attempts(match_attempts: Vec<MatchAttempt>) -> Self {
        Self {
            match_attempts,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.match_attempts.is_empty() && self.trace.is_none() && self.failed.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum PilotError {
    #[error("Window scope not found")]
    ScopeNotFound { data: ErrorData },

    #[error("{message}")]
    ElementNotFound { message: String, data: ErrorData },

    #[error("Ambiguous match for selector rung")]
    AmbiguousMatch { data: ErrorData },

    #[error("{message}")]
    ActionFailed { message: String, data: ErrorData },

    #[error("Assertion check failed")]
    AssertionFailed { data: ErrorData },

    #[error("Operation timed out")]
    Timeout { data: ErrorData },

    #[error("Visual anchor matching is unavailable")]
    VisualAnchorUnavailable { data: ErrorData },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl PilotError {
    pub fn scope_not_found() -> Self {
        Self::ScopeNotFound {
            data: ErrorData::default(),
        }
    }

    pub fn element_not_found(match_attempts: Vec<MatchAttempt>) -> Self {
        Self::ElementNotFound {
            message: "No match for selector ladder".to_string(),
            data: ErrorData::with_attempts(match_attempts),
        }
    }

    pub fn empty_ladder() -> Self {
        Self::ElementNotFound {
            message: "Target ladder is empty".to_string(),
            data: ErrorData::default(),
        }
    }

    pub fn action_failed(message: impl Into<String>) -> Self {
        Self::ActionFailed {
            message: message.into(),
            data: ErrorData::default(),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            PilotError::ScopeNotFound { .. } => codes::SCOPE_NOT_FOUND,
            PilotError::ElementNotFound { .. } => codes::ELEMENT_NOT_FOUND,
            PilotError::AmbiguousMatch { .. } => codes::AMBIGUOUS_MATCH,
            PilotError::ActionFailed { .. } => codes::ACTION_FAILED,
            PilotError::AssertionFailed { .. } => codes::ASSERTION_FAILED,
            PilotError::Timeout { .. } => codes::TIMEOUT,
            PilotError::VisualAnchorUnavailable { .. } => codes::VISUAL_ANCHOR_UNAVAILABLE,
            PilotError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    pub fn data(&self) -> Option<&ErrorData> {
        match self {
            PilotError::ScopeNotFound { data }
            | PilotError::ElementNotFound { data, .. }
            | PilotError::AmbiguousMatch { data }
            | PilotError::ActionFailed { data, .. }
            | PilotError::AssertionFailed { data }
            | PilotError::Timeout { data }
            | PilotError::VisualAnchorUnavailable { data } => Some(data),
            PilotError::Internal(_) => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut ErrorData> {
        match self {
            PilotError::ScopeNotFound { data }
            | PilotError::ElementNotFound { data, .. }
            | PilotError::AmbiguousMatch { data }
            | PilotError::ActionFailed { data, .. }
            | PilotError::AssertionFailed { data }
            | PilotError::Timeout { data }
            | PilotError::VisualAnchorUnavailable { data } => Some(data),
            PilotError::Internal(_) => None,
        }
    }

    /// Consume the error, yielding its payload when one is attached.
    pub fn into_data(self) -> Option<ErrorData> {
        match self {
            PilotError::ScopeNotFound { data }
            | PilotError::ElementNotFound { data, .. }
            | PilotError::AmbiguousMatch { data }
            | PilotError::ActionFailed { data, .. }
            | PilotError::AssertionFailed { data }
            | PilotError::Timeout { data }
            | PilotError::VisualAnchorUnavailable { data } => Some(data),
            PilotError::Internal(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PilotError>;
