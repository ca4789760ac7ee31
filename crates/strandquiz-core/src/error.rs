//! Error types shared across strandquiz.
//!
//! `ServiceError` is defined here rather than in `strandquiz-client` so
//! callers holding an `anyhow::Error` from a collaborator can classify it by
//! downcasting instead of string matching.

use thiserror::Error;

use crate::model::QuestionId;
use crate::session::Phase;

/// Failures talking to the question or grading service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service returned an error response.
    #[error("service error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The requested grade/subject does not exist on the service.
    #[error("not found: {0}")]
    NotFound(String),

    /// The response body could not be understood.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),
}

impl ServiceError {
    /// Returns `true` if retrying the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(self, ServiceError::NotFound(_) | ServiceError::Malformed(_))
    }
}

/// A question or grading record violated its construction invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestionError {
    #[error("question has no id")]
    MissingId,

    #[error("score {score} exceeds total {total}")]
    ScoreExceedsTotal { score: u32, total: u32 },
}

/// A session command that was refused without changing state.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Rejection {
    /// The command is not valid in the current phase.
    #[error("cannot {action} while {phase}")]
    WrongPhase { action: &'static str, phase: Phase },

    /// A submission is already in flight.
    #[error("a submission is already in progress")]
    Busy,

    /// The question is not part of the strand being presented.
    #[error("question {0} is not in the current strand")]
    NotInCurrentStrand(QuestionId),
}
