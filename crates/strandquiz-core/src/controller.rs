//! Async session driver.
//!
//! Owns a [`SessionState`] and performs the network work its transitions
//! ask for: question fetches, grading calls, and the report export that
//! follows a graded strand. User-visible notices go to a [`NoticeSink`].

use std::path::PathBuf;
use std::sync::Arc;

use crate::model::{Question, QuestionId, QuizIdentity};
use crate::session::{FetchTicket, RequestToken, SessionEvent, SessionState, Step};
use crate::traits::{GradingClient, QuestionSource, ReportExporter};

/// Severity of a learner-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A short message for the learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Receives notices as the session runs.
pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// No-op notice sink.
pub struct NoopSink;

impl NoticeSink for NoopSink {
    fn notify(&self, _: &Notice) {}
}

/// Guidance shown when a fetch produced no questions.
pub fn empty_state_guidance(identity: &QuizIdentity) -> String {
    let filter = identity
        .strand
        .as_ref()
        .map(|s| format!(" ({s})"))
        .unwrap_or_default();
    format!(
        "No questions found for this selection. If the address is right, sit tight: \
         questions for {}{filter} are being updated.",
        identity.subject
    )
}

/// The notice, if any, that an event should raise.
pub fn notice_for(event: &SessionEvent) -> Option<Notice> {
    match event {
        SessionEvent::FetchFailed { message, .. } => Some(Notice::new(
            NoticeLevel::Error,
            format!("Could not load questions: {message}"),
        )),
        SessionEvent::NoQuestions(identity) => {
            Some(Notice::new(NoticeLevel::Info, empty_state_guidance(identity)))
        }
        SessionEvent::ValidationFailed { .. } => Some(Notice::new(
            NoticeLevel::Error,
            "Please answer the questions for this strand!",
        )),
        SessionEvent::Graded(export) => Some(Notice::new(
            NoticeLevel::Success,
            format!("{} Completed!", export.strand),
        )),
        SessionEvent::SubmissionFailed { message, .. } => Some(Notice::new(
            NoticeLevel::Error,
            format!("Submission failed: {message}"),
        )),
        SessionEvent::Completed { .. } => {
            Some(Notice::new(NoticeLevel::Success, "All strands completed!"))
        }
        SessionEvent::Rejected(rejection) => {
            Some(Notice::new(NoticeLevel::Error, rejection.to_string()))
        }
        SessionEvent::Loading(_)
        | SessionEvent::Presenting { .. }
        | SessionEvent::AnswerRecorded(_)
        | SessionEvent::Submitting(_)
        | SessionEvent::Cancelled
        | SessionEvent::StaleResponseDiscarded(_) => None,
    }
}

/// Drives one quiz session against its collaborators.
pub struct QuizController {
    source: Arc<dyn QuestionSource>,
    grader: Arc<dyn GradingClient>,
    exporter: Arc<dyn ReportExporter>,
    notices: Arc<dyn NoticeSink>,
    state: SessionState,
    last_export: Option<Vec<PathBuf>>,
}

impl QuizController {
    pub fn new(
        source: Arc<dyn QuestionSource>,
        grader: Arc<dyn GradingClient>,
        exporter: Arc<dyn ReportExporter>,
    ) -> Self {
        Self {
            source,
            grader,
            exporter,
            notices: Arc::new(NoopSink),
            state: SessionState::new(),
            last_export: None,
        }
    }

    pub fn with_notices(mut self, notices: Arc<dyn NoticeSink>) -> Self {
        self.notices = notices;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Files written for the strand graded by the latest submission.
    pub fn last_export(&self) -> Option<&[PathBuf]> {
        self.last_export.as_deref()
    }

    fn apply(&mut self, transition: impl FnOnce(SessionState) -> Step) -> SessionEvent {
        let Step { state, event } = transition(std::mem::take(&mut self.state));
        self.state = state;
        if let Some(notice) = notice_for(&event) {
            self.notices.notify(&notice);
        }
        event
    }

    /// Fetch and present questions for `identity`.
    pub async fn load(&mut self, identity: QuizIdentity) -> SessionEvent {
        let Some(ticket) = self.begin_load(identity) else {
            return SessionEvent::Cancelled;
        };
        let outcome = self.fetch(&ticket).await;
        self.complete_load(ticket.token, outcome)
    }

    /// Start a fetch without performing it. Returns the ticket to fetch with.
    pub fn begin_load(&mut self, identity: QuizIdentity) -> Option<FetchTicket> {
        match self.apply(|state| state.begin_fetch(identity)) {
            SessionEvent::Loading(ticket) => Some(ticket),
            _ => None,
        }
    }

    /// Perform the fetch a ticket describes.
    pub async fn fetch(&self, ticket: &FetchTicket) -> anyhow::Result<Vec<Question>> {
        tracing::debug!(source = self.source.name(), identity = %ticket.identity, "fetching");
        self.source
            .fetch(&ticket.identity.grade, &ticket.identity.subject)
            .await
    }

    /// Apply a fetch outcome. Outcomes for superseded tickets are discarded.
    pub fn complete_load(
        &mut self,
        token: RequestToken,
        outcome: anyhow::Result<Vec<Question>>,
    ) -> SessionEvent {
        self.apply(|state| state.apply_fetch(token, outcome))
    }

    /// Record an answer for a question of the current strand.
    pub fn answer(&mut self, id: QuestionId, value: impl Into<String>) -> SessionEvent {
        let value = value.into();
        self.apply(|state| state.record_answer(id, value))
    }

    /// Submit the current strand, then export the graded report.
    ///
    /// Export failures raise a notice but never change the session.
    pub async fn submit(&mut self) -> SessionEvent {
        let ticket = match self.apply(SessionState::request_submit) {
            SessionEvent::Submitting(ticket) => ticket,
            other => return other,
        };
        self.last_export = None;

        let outcome = self.grader.submit(&ticket.answers).await;
        let event = self.apply(|state| state.apply_grading(ticket.token, outcome));

        if let SessionEvent::Graded(request) = &event {
            match self.exporter.export(request) {
                Ok(paths) => {
                    tracing::info!(files = paths.len(), strand = %request.strand, "report exported");
                    self.last_export = Some(paths);
                }
                Err(e) => {
                    tracing::warn!(strand = %request.strand, "report export failed: {e:#}");
                    self.notices.notify(&Notice::new(
                        NoticeLevel::Error,
                        format!("Failed to generate report: {e:#}"),
                    ));
                }
            }
        }
        event
    }

    /// Continue past a graded strand.
    pub fn advance(&mut self) -> SessionEvent {
        self.apply(SessionState::advance)
    }

    /// Stop waiting on any outstanding request.
    pub fn leave(&mut self) -> SessionEvent {
        self.apply(SessionState::cancel_pending)
    }
}
