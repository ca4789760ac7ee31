//! Collaborator trait definitions.
//!
//! The session engine talks to the outside world only through these
//! traits. `strandquiz-client` implements the question and grading
//! services; `strandquiz-report` implements the exporter.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::answers::AnswerSet;
use crate::model::{GradingResult, Question};
use crate::report::ExportRequest;

// ---------------------------------------------------------------------------
// Question source
// ---------------------------------------------------------------------------

/// Supplies the raw question list for a grade and subject.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Human-readable source name (e.g. "http").
    fn name(&self) -> &str;

    /// Fetch all questions for `grade`/`subject`. An empty list is a valid answer.
    async fn fetch(&self, grade: &str, subject: &str) -> anyhow::Result<Vec<Question>>;
}

// ---------------------------------------------------------------------------
// Grading client
// ---------------------------------------------------------------------------

/// Grades a set of answers. The service is the only judge of correctness.
#[async_trait]
pub trait GradingClient: Send + Sync {
    async fn submit(&self, answers: &AnswerSet) -> anyhow::Result<GradingResult>;
}

// ---------------------------------------------------------------------------
// Report exporter
// ---------------------------------------------------------------------------

/// Renders a graded strand into downloadable files.
pub trait ReportExporter: Send + Sync {
    /// Write the report and return the paths of the files produced.
    fn export(&self, request: &ExportRequest) -> anyhow::Result<Vec<PathBuf>>;
}

/// Exporter that writes nothing.
pub struct NoopExporter;

impl ReportExporter for NoopExporter {
    fn export(&self, _: &ExportRequest) -> anyhow::Result<Vec<PathBuf>> {
        Ok(Vec::new())
    }
}
