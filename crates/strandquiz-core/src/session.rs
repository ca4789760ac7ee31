//! The quiz session state machine.
//!
//! A session moves through
//! `Loading → Presenting → Submitting → ShowingResult → {Presenting | Completed}`,
//! one strand at a time. Every transition consumes the current
//! [`SessionState`] and returns a [`Step`]: the next state plus the
//! [`SessionEvent`] the learner should be told about. Rejected commands
//! hand the state back unchanged.
//!
//! Network work happens outside this module. Starting a fetch or a
//! submission yields a ticket carrying a [`RequestToken`]; the response is
//! applied only if the token is still the one the session is waiting for,
//! so a late answer for an abandoned request can never overwrite newer
//! state.

use std::fmt;

use serde::Serialize;

use crate::answers::{AnswerSet, AnswerStore};
use crate::error::Rejection;
use crate::grouping::group;
use crate::model::{GradingResult, Question, QuestionId, QuizIdentity, Strand};
use crate::report::ExportRequest;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing has been requested yet.
    Idle,
    Loading,
    /// The last fetch produced no questions.
    Empty,
    Presenting,
    Submitting,
    ShowingResult,
    Completed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Idle => "idle",
            Phase::Loading => "loading",
            Phase::Empty => "empty",
            Phase::Presenting => "presenting",
            Phase::Submitting => "submitting",
            Phase::ShowingResult => "showing result",
            Phase::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Identifies one outstanding fetch or submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RequestToken(u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Instructions for the question fetch the session is now waiting on.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub token: RequestToken,
    pub identity: QuizIdentity,
}

/// Instructions for the grading call the session is now waiting on.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitTicket {
    pub token: RequestToken,
    pub strand: String,
    /// Answers for the current strand only.
    pub answers: AnswerSet,
}

/// 1-based position of the current strand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub position: usize,
    pub total: usize,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.position as f64 / self.total as f64
        }
    }
}

/// What a transition produced, for the learner or for the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A fetch must be performed with this ticket.
    Loading(FetchTicket),
    /// A strand is now on screen.
    Presenting { strand: String, progress: Progress },
    /// The fetch succeeded but nothing matched.
    NoQuestions(QuizIdentity),
    /// The fetch failed; `restored` tells whether earlier content is back on screen.
    FetchFailed {
        identity: QuizIdentity,
        message: String,
        restored: bool,
    },
    AnswerRecorded(QuestionId),
    /// Submit was attempted with no answers for the current strand.
    ValidationFailed { strand: String },
    /// A grading call must be performed with this ticket.
    Submitting(SubmitTicket),
    /// The strand was graded; the report should be exported.
    Graded(ExportRequest),
    SubmissionFailed { strand: String, message: String },
    /// The last strand has been finished.
    Completed { strands: usize },
    /// Interest in the outstanding request was dropped.
    Cancelled,
    /// A response arrived for a request the session no longer waits on.
    StaleResponseDiscarded(RequestToken),
    Rejected(Rejection),
}

/// The result of a transition.
#[derive(Debug, Clone)]
#[must_use]
pub struct Step {
    pub state: SessionState,
    pub event: SessionEvent,
}

/// What the learner was looking at before a fetch started, restored if
/// that fetch fails.
#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    identity: Option<QuizIdentity>,
    strands: Vec<Strand>,
    current_index: usize,
    phase: Phase,
    last_result: Option<GradingResult>,
    answers: AnswerStore,
}

/// The complete state of one quiz session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    identity: Option<QuizIdentity>,
    strands: Vec<Strand>,
    current_index: usize,
    phase: Phase,
    last_result: Option<GradingResult>,
    answers: AnswerStore,
    pending: Option<RequestToken>,
    next_token: u64,
    previous: Option<Box<Snapshot>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            identity: None,
            strands: Vec::new(),
            current_index: 0,
            phase: Phase::Idle,
            last_result: None,
            answers: AnswerStore::new(),
            pending: None,
            next_token: 0,
            previous: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn identity(&self) -> Option<&QuizIdentity> {
        self.identity.as_ref()
    }

    pub fn strands(&self) -> &[Strand] {
        &self.strands
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The strand being worked on, while one is on screen.
    pub fn current_strand(&self) -> Option<&Strand> {
        match self.phase {
            Phase::Presenting | Phase::Submitting | Phase::ShowingResult => {
                self.strands.get(self.current_index)
            }
            _ => None,
        }
    }

    pub fn last_result(&self) -> Option<&GradingResult> {
        self.last_result.as_ref()
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    /// The request the session is waiting on, if any.
    pub fn pending(&self) -> Option<RequestToken> {
        self.pending
    }

    pub fn progress(&self) -> Option<Progress> {
        self.current_strand().map(|_| Progress {
            position: self.current_index + 1,
            total: self.strands.len(),
        })
    }

    /// Whether the strand on screen is the last one.
    pub fn is_last_strand(&self) -> bool {
        !self.strands.is_empty() && self.current_index + 1 == self.strands.len()
    }

    fn issue_token(&mut self) -> RequestToken {
        self.next_token += 1;
        RequestToken(self.next_token)
    }

    fn step(self, event: SessionEvent) -> Step {
        Step { state: self, event }
    }

    fn reject(self, rejection: Rejection) -> Step {
        tracing::debug!(phase = %self.phase, "rejected: {rejection}");
        self.step(SessionEvent::Rejected(rejection))
    }

    fn stale(self, token: RequestToken) -> Step {
        tracing::warn!(%token, pending = ?self.pending, "discarding stale response");
        self.step(SessionEvent::StaleResponseDiscarded(token))
    }

    fn presenting_event(&self) -> SessionEvent {
        SessionEvent::Presenting {
            strand: self.strands[self.current_index].name.clone(),
            progress: Progress {
                position: self.current_index + 1,
                total: self.strands.len(),
            },
        }
    }

    /// Start loading questions for `identity`.
    ///
    /// Allowed from any phase. Supersedes whatever request was outstanding,
    /// resets the strand pointer, and drops the last result. The content on
    /// screen is set aside and comes back if the fetch fails.
    pub fn begin_fetch(mut self, identity: QuizIdentity) -> Step {
        match self.phase {
            Phase::Idle => self.previous = None,
            // Keep the snapshot taken when the first fetch started.
            Phase::Loading => {}
            phase => {
                let phase = if phase == Phase::Submitting {
                    Phase::Presenting
                } else {
                    phase
                };
                self.previous = Some(Box::new(Snapshot {
                    identity: self.identity.take(),
                    strands: std::mem::take(&mut self.strands),
                    current_index: self.current_index,
                    phase,
                    last_result: self.last_result.take(),
                    answers: std::mem::take(&mut self.answers),
                }));
            }
        }

        let token = self.issue_token();
        tracing::debug!(%token, %identity, "fetching questions");

        self.identity = Some(identity.clone());
        self.strands.clear();
        self.current_index = 0;
        self.last_result = None;
        self.answers.clear();
        self.phase = Phase::Loading;
        self.pending = Some(token);

        self.step(SessionEvent::Loading(FetchTicket { token, identity }))
    }

    /// Apply the outcome of the fetch issued with `token`.
    pub fn apply_fetch(mut self, token: RequestToken, outcome: anyhow::Result<Vec<Question>>) -> Step {
        if self.pending != Some(token) || self.phase != Phase::Loading {
            return self.stale(token);
        }
        self.pending = None;
        let Some(identity) = self.identity.clone() else {
            return self.stale(token);
        };

        match outcome {
            Ok(questions) => {
                self.previous = None;
                self.strands = group(questions, identity.strand.as_deref());
                self.current_index = 0;
                self.last_result = None;
                self.answers.clear();

                if self.strands.is_empty() {
                    tracing::info!(%identity, "no questions found");
                    self.phase = Phase::Empty;
                    self.step(SessionEvent::NoQuestions(identity))
                } else {
                    tracing::debug!(%identity, strands = self.strands.len(), "questions loaded");
                    self.phase = Phase::Presenting;
                    let event = self.presenting_event();
                    self.step(event)
                }
            }
            Err(e) => {
                let message = format!("{e:#}");
                tracing::warn!(%identity, "fetch failed: {message}");
                let restored = self.restore_previous();
                self.step(SessionEvent::FetchFailed {
                    identity,
                    message,
                    restored,
                })
            }
        }
    }

    /// Put back the content set aside by `begin_fetch`, or fall to `Empty`.
    fn restore_previous(&mut self) -> bool {
        match self.previous.take() {
            Some(snapshot) if snapshot.phase != Phase::Idle => {
                let snapshot = *snapshot;
                self.identity = snapshot.identity;
                self.strands = snapshot.strands;
                self.current_index = snapshot.current_index;
                self.phase = snapshot.phase;
                self.last_result = snapshot.last_result;
                self.answers = snapshot.answers;
                true
            }
            _ => {
                self.strands.clear();
                self.current_index = 0;
                self.phase = Phase::Empty;
                false
            }
        }
    }

    /// Record the learner's answer for a question of the current strand.
    pub fn record_answer(mut self, id: QuestionId, value: impl Into<String>) -> Step {
        if self.phase != Phase::Presenting {
            let phase = self.phase;
            return self.reject(Rejection::WrongPhase {
                action: "answer",
                phase,
            });
        }
        let in_strand = self
            .current_strand()
            .is_some_and(|strand| strand.contains(&id));
        if !in_strand {
            return self.reject(Rejection::NotInCurrentStrand(id));
        }

        self.answers.set(id.clone(), value);
        self.step(SessionEvent::AnswerRecorded(id))
    }

    /// Submit the current strand for grading.
    ///
    /// Refused without a network call when the strand has no answers.
    pub fn request_submit(mut self) -> Step {
        match self.phase {
            Phase::Presenting => {}
            Phase::Submitting => return self.reject(Rejection::Busy),
            phase => {
                return self.reject(Rejection::WrongPhase {
                    action: "submit",
                    phase,
                })
            }
        }

        let strand = &self.strands[self.current_index];
        if !self.answers.has_any(strand.question_ids()) {
            let strand = strand.name.clone();
            tracing::debug!(%strand, "submit refused: nothing answered");
            return self.step(SessionEvent::ValidationFailed { strand });
        }

        let answers = self.answers.answers_for(strand.question_ids());
        let strand = strand.name.clone();
        let token = self.issue_token();
        tracing::debug!(%token, %strand, answered = answers.len(), "submitting strand");

        self.phase = Phase::Submitting;
        self.pending = Some(token);
        self.step(SessionEvent::Submitting(SubmitTicket {
            token,
            strand,
            answers,
        }))
    }

    /// Apply the grading service's response to the submission issued with `token`.
    pub fn apply_grading(mut self, token: RequestToken, outcome: anyhow::Result<GradingResult>) -> Step {
        if self.pending != Some(token) || self.phase != Phase::Submitting {
            return self.stale(token);
        }
        let Some(identity) = self.identity.clone() else {
            return self.stale(token);
        };
        self.pending = None;
        let strand = self.strands[self.current_index].name.clone();

        match outcome {
            Ok(result) => {
                tracing::info!(%strand, score = result.score, total = result.total, "strand graded");
                let export = ExportRequest::new(&identity, &strand, &result);
                self.last_result = Some(result);
                self.phase = Phase::ShowingResult;
                self.step(SessionEvent::Graded(export))
            }
            Err(e) => {
                let message = format!("{e:#}");
                tracing::warn!(%strand, "submission failed: {message}");
                self.phase = Phase::Presenting;
                self.step(SessionEvent::SubmissionFailed { strand, message })
            }
        }
    }

    /// Move on from a graded strand to the next one, or finish.
    pub fn advance(mut self) -> Step {
        if self.phase != Phase::ShowingResult {
            let phase = self.phase;
            return self.reject(Rejection::WrongPhase {
                action: "advance",
                phase,
            });
        }

        if self.current_index + 1 < self.strands.len() {
            self.current_index += 1;
            self.phase = Phase::Presenting;
            let event = self.presenting_event();
            self.step(event)
        } else {
            tracing::info!(strands = self.strands.len(), "all strands completed");
            self.phase = Phase::Completed;
            let strands = self.strands.len();
            self.step(SessionEvent::Completed { strands })
        }
    }

    /// Stop waiting for the outstanding request. Its response, if it ever
    /// arrives, will be discarded.
    pub fn cancel_pending(mut self) -> Step {
        let Some(token) = self.pending.take() else {
            return self.step(SessionEvent::Cancelled);
        };
        tracing::debug!(%token, phase = %self.phase, "cancelled pending request");

        match self.phase {
            Phase::Loading => {
                self.restore_previous();
            }
            Phase::Submitting => self.phase = Phase::Presenting,
            _ => {}
        }
        self.step(SessionEvent::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BreakdownItem;

    fn q(id: &str, strand: &str) -> Question {
        Question::new(id, format!("question {id}"), Some(strand.into())).unwrap()
    }

    fn sample() -> Vec<Question> {
        vec![q("1", "Nouns"), q("2", "Nouns"), q("3", "Verbs")]
    }

    fn identity() -> QuizIdentity {
        QuizIdentity::new("3", "english")
    }

    fn graded(score: u32, total: u32) -> GradingResult {
        GradingResult::new(
            score,
            total,
            vec![BreakdownItem {
                question: "question 1".into(),
                user_answer: Some("cat".into()),
                correct_answer: Some("cat".into()),
                is_correct: true,
            }],
        )
        .unwrap()
    }

    fn fetch_ticket(step: &Step) -> RequestToken {
        match &step.event {
            SessionEvent::Loading(ticket) => ticket.token,
            other => panic!("expected Loading, got {other:?}"),
        }
    }

    fn submit_ticket(step: &Step) -> SubmitTicket {
        match &step.event {
            SessionEvent::Submitting(ticket) => ticket.clone(),
            other => panic!("expected Submitting, got {other:?}"),
        }
    }

    fn loaded(questions: Vec<Question>) -> SessionState {
        let step = SessionState::new().begin_fetch(identity());
        let token = fetch_ticket(&step);
        step.state.apply_fetch(token, Ok(questions)).state
    }

    fn answer(state: SessionState, id: &str, value: &str) -> SessionState {
        let step = state.record_answer(QuestionId::new(id), value);
        assert_eq!(step.event, SessionEvent::AnswerRecorded(QuestionId::new(id)));
        step.state
    }

    fn submit_and_grade(state: SessionState, result: GradingResult) -> Step {
        let step = state.request_submit();
        let ticket = submit_ticket(&step);
        step.state.apply_grading(ticket.token, Ok(result))
    }

    #[test]
    fn new_session_is_idle() {
        let state = SessionState::new();
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.current_strand().is_none());
        assert!(state.progress().is_none());
    }

    #[test]
    fn fetch_presents_first_strand() {
        let step = SessionState::new().begin_fetch(identity());
        assert_eq!(step.state.phase(), Phase::Loading);
        let token = fetch_ticket(&step);

        let step = step.state.apply_fetch(token, Ok(sample()));
        assert_eq!(step.state.phase(), Phase::Presenting);
        assert_eq!(step.state.current_index(), 0);
        assert_eq!(step.state.strands().len(), 2);
        assert_eq!(step.state.current_strand().unwrap().name, "Nouns");
        assert_eq!(
            step.event,
            SessionEvent::Presenting {
                strand: "Nouns".into(),
                progress: Progress {
                    position: 1,
                    total: 2
                },
            }
        );
        assert!(step.state.pending().is_none());
    }

    #[test]
    fn filtered_fetch_keeps_matching_strand() {
        let step = SessionState::new().begin_fetch(identity().with_strand("verbs"));
        let token = fetch_ticket(&step);
        let state = step.state.apply_fetch(token, Ok(sample())).state;
        assert_eq!(state.strands().len(), 1);
        assert_eq!(state.strands()[0].name, "Verbs");
    }

    #[test]
    fn empty_fetch_is_empty_state() {
        let step = SessionState::new().begin_fetch(identity().with_strand("adjectives"));
        let token = fetch_ticket(&step);
        let step = step.state.apply_fetch(token, Ok(sample()));
        assert_eq!(step.state.phase(), Phase::Empty);
        assert!(matches!(step.event, SessionEvent::NoQuestions(_)));

        let step = step.state.request_submit();
        assert!(matches!(step.event, SessionEvent::Rejected(_)));
    }

    #[test]
    fn failed_first_fetch_is_empty_state() {
        let step = SessionState::new().begin_fetch(identity());
        let token = fetch_ticket(&step);
        let step = step
            .state
            .apply_fetch(token, Err(anyhow::anyhow!("connection refused")));
        assert_eq!(step.state.phase(), Phase::Empty);
        match step.event {
            SessionEvent::FetchFailed {
                message, restored, ..
            } => {
                assert!(message.contains("connection refused"));
                assert!(!restored);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn failed_refetch_restores_previous_content() {
        let state = loaded(sample());
        let state = answer(state, "1", "cat");
        let state = submit_and_grade(state, graded(1, 2)).state;
        let state = state.advance().state;
        assert_eq!(state.current_index(), 1);
        let before = state.clone();

        let step = state.begin_fetch(QuizIdentity::new("4", "math"));
        assert_eq!(step.state.current_index(), 0);
        assert!(step.state.last_result().is_none());
        let token = fetch_ticket(&step);

        let step = step.state.apply_fetch(token, Err(anyhow::anyhow!("503")));
        assert!(matches!(
            step.event,
            SessionEvent::FetchFailed { restored: true, .. }
        ));
        assert_eq!(step.state.phase(), Phase::Presenting);
        assert_eq!(step.state.current_index(), 1);
        assert_eq!(step.state.identity(), before.identity());
        assert_eq!(step.state.answers().get(&QuestionId::new("1")), Some("cat"));
        assert_eq!(step.state.last_result(), before.last_result());
    }

    #[test]
    fn stale_fetch_response_is_discarded() {
        let step = SessionState::new().begin_fetch(identity());
        let old = fetch_ticket(&step);
        let step = step.state.begin_fetch(identity().with_strand("verbs"));
        let new = fetch_ticket(&step);
        assert_ne!(old, new);

        // The newer request resolves first.
        let step = step.state.apply_fetch(new, Ok(sample()));
        assert_eq!(step.state.strands().len(), 1);
        let snapshot = step.state.clone();

        // The old response arrives late and must not overwrite anything.
        let step = step
            .state
            .apply_fetch(old, Ok(vec![q("9", "Spelling")]));
        assert_eq!(step.event, SessionEvent::StaleResponseDiscarded(old));
        assert_eq!(step.state, snapshot);
    }

    #[test]
    fn stale_response_while_newer_fetch_pending() {
        let step = SessionState::new().begin_fetch(identity());
        let old = fetch_ticket(&step);
        let step = step.state.begin_fetch(QuizIdentity::new("4", "math"));
        let new = fetch_ticket(&step);

        let step = step.state.apply_fetch(old, Ok(sample()));
        assert!(matches!(step.event, SessionEvent::StaleResponseDiscarded(_)));
        assert_eq!(step.state.phase(), Phase::Loading);
        assert_eq!(step.state.pending(), Some(new));
    }

    #[test]
    fn superseded_fetch_keeps_first_snapshot() {
        let state = loaded(sample());
        let state = answer(state, "1", "cat");
        let before = state.clone();

        let step = state.begin_fetch(QuizIdentity::new("4", "math"));
        let first = fetch_ticket(&step);
        let step = step.state.begin_fetch(QuizIdentity::new("6", "science"));
        let second = fetch_ticket(&step);

        let step = step.state.apply_fetch(first, Ok(vec![q("9", "Spelling")]));
        assert_eq!(step.event, SessionEvent::StaleResponseDiscarded(first));

        let step = step.state.apply_fetch(second, Err(anyhow::anyhow!("timeout")));
        assert!(matches!(
            step.event,
            SessionEvent::FetchFailed { restored: true, .. }
        ));
        assert_eq!(step.state.phase(), Phase::Presenting);
        assert_eq!(step.state.identity(), before.identity());
        assert_eq!(step.state.strands(), before.strands());
        assert_eq!(step.state.answers().get(&QuestionId::new("1")), Some("cat"));
    }

    #[test]
    fn repeated_question_id_is_not_resubmitted_in_later_strand() {
        let state = loaded(vec![q("1", "Nouns"), q("1", "Verbs"), q("2", "Verbs")]);
        assert_eq!(state.strands().len(), 2);
        assert!(!state.strands()[1].contains(&QuestionId::new("1")));

        let state = answer(state, "1", "cat");
        let state = submit_and_grade(state, graded(1, 1)).state;
        let state = state.advance().state;
        assert_eq!(state.current_strand().unwrap().name, "Verbs");

        let step = state.request_submit();
        assert_eq!(
            step.event,
            SessionEvent::ValidationFailed {
                strand: "Verbs".into()
            }
        );
    }

    #[test]
    fn answers_only_accepted_for_current_strand() {
        let state = loaded(sample());
        let step = state.record_answer(QuestionId::new("3"), "run");
        assert_eq!(
            step.event,
            SessionEvent::Rejected(Rejection::NotInCurrentStrand(QuestionId::new("3")))
        );
        assert!(step.state.answers().is_empty());

        let step = SessionState::new().record_answer(QuestionId::new("1"), "cat");
        assert!(matches!(
            step.event,
            SessionEvent::Rejected(Rejection::WrongPhase {
                action: "answer",
                ..
            })
        ));
    }

    #[test]
    fn submit_without_answers_is_validation_failure() {
        let state = loaded(sample());
        let step = state.request_submit();
        assert_eq!(
            step.event,
            SessionEvent::ValidationFailed {
                strand: "Nouns".into()
            }
        );
        assert_eq!(step.state.phase(), Phase::Presenting);
        assert_eq!(step.state.current_index(), 0);
        assert!(step.state.pending().is_none());
    }

    #[test]
    fn empty_answer_does_not_count() {
        let state = answer(loaded(sample()), "1", "");
        let step = state.request_submit();
        assert!(matches!(step.event, SessionEvent::ValidationFailed { .. }));
    }

    #[test]
    fn partial_answers_submit_only_current_strand() {
        let state = answer(loaded(sample()), "1", "cat");
        let step = state.request_submit();
        assert_eq!(step.state.phase(), Phase::Submitting);
        let ticket = submit_ticket(&step);
        assert_eq!(ticket.strand, "Nouns");
        assert_eq!(ticket.answers.len(), 1);
        assert_eq!(
            ticket.answers.get(&QuestionId::new("1")).map(String::as_str),
            Some("cat")
        );
    }

    #[test]
    fn second_submit_while_submitting_is_busy() {
        let state = answer(loaded(sample()), "1", "cat");
        let step = state.request_submit();
        let pending = step.state.pending();
        let step = step.state.request_submit();
        assert_eq!(step.event, SessionEvent::Rejected(Rejection::Busy));
        assert_eq!(step.state.pending(), pending);
    }

    #[test]
    fn graded_result_is_stored_verbatim_and_exported() {
        let state = answer(loaded(sample()), "1", "cat");
        let result = graded(1, 2);
        let step = submit_and_grade(state, result.clone());

        assert_eq!(step.state.phase(), Phase::ShowingResult);
        assert_eq!(step.state.last_result(), Some(&result));
        match step.event {
            SessionEvent::Graded(export) => {
                assert_eq!(export.breakdown, result.breakdown);
                assert_eq!(export.score, 1);
                assert_eq!(export.total, 2);
                assert_eq!(export.strand, "Nouns");
                assert_eq!(export.subject, "english");
                assert_eq!(export.grade, "3");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn failed_grading_returns_to_presenting_with_answers() {
        let state = answer(loaded(sample()), "1", "cat");
        let step = state.request_submit();
        let ticket = submit_ticket(&step);
        let step = step
            .state
            .apply_grading(ticket.token, Err(anyhow::anyhow!("HTTP 500")));

        assert_eq!(step.state.phase(), Phase::Presenting);
        assert_eq!(step.state.current_index(), 0);
        assert!(step.state.last_result().is_none());
        assert_eq!(step.state.answers().get(&QuestionId::new("1")), Some("cat"));
        assert!(matches!(step.event, SessionEvent::SubmissionFailed { .. }));

        // Resubmission is possible.
        let step = step.state.request_submit();
        assert!(matches!(step.event, SessionEvent::Submitting(_)));
    }

    #[test]
    fn advance_moves_to_next_strand() {
        let state = answer(loaded(sample()), "1", "cat");
        let state = submit_and_grade(state, graded(1, 2)).state;

        let step = state.advance();
        assert_eq!(step.state.phase(), Phase::Presenting);
        assert_eq!(step.state.current_index(), 1);
        assert_eq!(step.state.current_strand().unwrap().name, "Verbs");
        assert_eq!(
            step.state.progress(),
            Some(Progress {
                position: 2,
                total: 2
            })
        );
        assert!(step.state.is_last_strand());
    }

    #[test]
    fn later_strand_submits_only_its_own_answers() {
        let state = answer(loaded(sample()), "1", "cat");
        let state = submit_and_grade(state, graded(1, 2)).state.advance().state;

        // Nothing answered on "Verbs" yet; the stray "Nouns" answer does not count.
        let step = state.request_submit();
        assert!(matches!(step.event, SessionEvent::ValidationFailed { .. }));

        let state = answer(step.state, "3", "run");
        let step = state.request_submit();
        let ticket = submit_ticket(&step);
        let keys: Vec<&str> = ticket.answers.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["3"]);
    }

    #[test]
    fn advancing_past_last_strand_completes() {
        let state = answer(loaded(sample()), "1", "cat");
        let state = submit_and_grade(state, graded(1, 2)).state.advance().state;
        let state = answer(state, "3", "run");
        let state = submit_and_grade(state, graded(1, 1)).state;

        let step = state.advance();
        assert_eq!(step.state.phase(), Phase::Completed);
        assert_eq!(step.event, SessionEvent::Completed { strands: 2 });
        assert!(step.state.current_strand().is_none());

        let step = step.state.advance();
        assert!(matches!(step.event, SessionEvent::Rejected(_)));
        assert_eq!(step.state.phase(), Phase::Completed);
    }

    #[test]
    fn advance_requires_a_result() {
        let step = loaded(sample()).advance();
        assert!(matches!(
            step.event,
            SessionEvent::Rejected(Rejection::WrongPhase {
                action: "advance",
                phase: Phase::Presenting
            })
        ));
        assert_eq!(step.state.current_index(), 0);
    }

    #[test]
    fn completed_session_restarts_on_new_fetch() {
        let state = answer(loaded(vec![q("1", "Nouns")]), "1", "cat");
        let state = submit_and_grade(state, graded(1, 1)).state.advance().state;
        assert_eq!(state.phase(), Phase::Completed);

        let step = state.begin_fetch(QuizIdentity::new("4", "math"));
        let token = fetch_ticket(&step);
        let state = step.state.apply_fetch(token, Ok(sample())).state;
        assert_eq!(state.phase(), Phase::Presenting);
        assert_eq!(state.current_index(), 0);
        assert!(state.answers().is_empty());
        assert!(state.last_result().is_none());
    }

    #[test]
    fn identity_change_during_submit_discards_grading_response() {
        let state = answer(loaded(sample()), "1", "cat");
        let step = state.request_submit();
        let submit = submit_ticket(&step);

        let step = step.state.begin_fetch(QuizIdentity::new("4", "math"));
        let step = step.state.apply_grading(submit.token, Ok(graded(1, 2)));
        assert!(matches!(step.event, SessionEvent::StaleResponseDiscarded(_)));
        assert_eq!(step.state.phase(), Phase::Loading);
        assert!(step.state.last_result().is_none());
    }

    #[test]
    fn cancel_pending_submit_returns_to_presenting() {
        let state = answer(loaded(sample()), "1", "cat");
        let step = state.request_submit();
        let ticket = submit_ticket(&step);

        let step = step.state.cancel_pending();
        assert_eq!(step.event, SessionEvent::Cancelled);
        assert_eq!(step.state.phase(), Phase::Presenting);

        let step = step.state.apply_grading(ticket.token, Ok(graded(1, 2)));
        assert!(matches!(step.event, SessionEvent::StaleResponseDiscarded(_)));
        assert!(step.state.last_result().is_none());
    }

    #[test]
    fn cancel_pending_fetch_restores_previous() {
        let state = loaded(sample());
        let step = state.begin_fetch(QuizIdentity::new("4", "math"));
        let token = fetch_ticket(&step);
        let step = step.state.cancel_pending();
        assert_eq!(step.state.phase(), Phase::Presenting);
        assert_eq!(step.state.identity(), Some(&identity()));

        let step = step.state.apply_fetch(token, Ok(vec![]));
        assert!(matches!(step.event, SessionEvent::StaleResponseDiscarded(_)));
        assert_eq!(step.state.phase(), Phase::Presenting);
    }

    #[test]
    fn progress_fraction() {
        let p = Progress {
            position: 1,
            total: 4,
        };
        assert_eq!(p.fraction(), 0.25);
        assert_eq!(
            Progress {
                position: 0,
                total: 0
            }
            .fraction(),
            0.0
        );
    }
}
