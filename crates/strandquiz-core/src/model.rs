//! Core data model types for strandquiz.
//!
//! These are the records exchanged with the question and grading services:
//! questions, strands, grading results, and the identity of a quiz request.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::QuestionError;

/// Strand name used for questions that do not declare one.
pub const DEFAULT_STRAND: &str = "General";

/// Stable identifier of a question as issued by the question service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for QuestionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A single question presented to the learner.
///
/// Immutable once fetched. The correct answer is kept for completeness of
/// the record but is never serialized back out, so it cannot leak into a
/// submission payload or an exported question list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuestionRecord")]
pub struct Question {
    #[serde(rename = "_id")]
    id: QuestionId,
    #[serde(rename = "questionText")]
    text: String,
    options: Vec<String>,
    #[serde(rename = "isTypeOpen")]
    is_open_ended: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    strand: Option<String>,
    #[serde(skip_serializing)]
    correct_answer: Option<String>,
}

/// Wire shape of a question as returned by the question service.
#[derive(Debug, Deserialize)]
struct QuestionRecord {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    #[serde(rename = "questionText", alias = "text", default)]
    text: String,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(rename = "isTypeOpen", alias = "isOpenEnded", default)]
    is_open_ended: bool,
    #[serde(default)]
    strand: Option<String>,
    #[serde(rename = "correctAnswer", default)]
    correct_answer: Option<String>,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = QuestionError;

    fn try_from(raw: QuestionRecord) -> Result<Self, Self::Error> {
        let mut question = Question::new(raw.id, raw.text, raw.strand)?;
        question.options = raw.options.unwrap_or_default();
        question.is_open_ended = raw.is_open_ended;
        question.correct_answer = raw.correct_answer;
        Ok(question)
    }
}

impl Question {
    /// Create an open-ended question. A blank strand counts as undeclared;
    /// such questions are grouped under [`DEFAULT_STRAND`].
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        strand: Option<String>,
    ) -> Result<Self, QuestionError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(QuestionError::MissingId);
        }
        let strand = strand
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            id: QuestionId(id),
            text: text.into(),
            options: Vec::new(),
            is_open_ended: true,
            strand,
            correct_answer: None,
        })
    }

    /// Turn this question into a multiple-choice question with the given options.
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self.is_open_ended = false;
        self
    }

    pub fn with_correct_answer(mut self, answer: impl Into<String>) -> Self {
        self.correct_answer = Some(answer.into());
        self
    }

    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn is_open_ended(&self) -> bool {
        self.is_open_ended
    }

    /// The strand this question is grouped under.
    pub fn strand(&self) -> &str {
        self.strand.as_deref().unwrap_or(DEFAULT_STRAND)
    }

    /// The strand the question service gave, if any.
    pub fn declared_strand(&self) -> Option<&str> {
        self.strand.as_deref()
    }

    pub fn correct_answer(&self) -> Option<&str> {
        self.correct_answer.as_deref()
    }
}

/// A named topical section of a quiz.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Strand {
    pub name: String,
    pub questions: Vec<Question>,
}

impl Strand {
    pub fn question_ids(&self) -> impl Iterator<Item = &QuestionId> {
        self.questions.iter().map(|q| q.id())
    }

    pub fn contains(&self, id: &QuestionId) -> bool {
        self.questions.iter().any(|q| q.id() == id)
    }
}

/// One graded line of a strand submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownItem {
    /// Question text as echoed by the grading service.
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub user_answer: Option<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub is_correct: bool,
}

/// The grading service's verdict for one strand submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GradingRecord")]
pub struct GradingResult {
    pub score: u32,
    pub total: u32,
    pub breakdown: Vec<BreakdownItem>,
}

#[derive(Debug, Deserialize)]
struct GradingRecord {
    score: u32,
    total: u32,
    #[serde(default)]
    breakdown: Vec<BreakdownItem>,
}

impl TryFrom<GradingRecord> for GradingResult {
    type Error = QuestionError;

    fn try_from(raw: GradingRecord) -> Result<Self, Self::Error> {
        GradingResult::new(raw.score, raw.total, raw.breakdown)
    }
}

impl GradingResult {
    pub fn new(score: u32, total: u32, breakdown: Vec<BreakdownItem>) -> Result<Self, QuestionError> {
        if score > total {
            return Err(QuestionError::ScoreExceedsTotal { score, total });
        }
        Ok(Self {
            score,
            total,
            breakdown,
        })
    }

    /// Fraction of the total that was scored, 0.0 when nothing was graded.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.score) / f64::from(self.total)
        }
    }
}

/// The (grade, subject, strand filter) triple that identifies what is being fetched.
///
/// Any change to it discards the running session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuizIdentity {
    pub grade: String,
    pub subject: String,
    #[serde(default)]
    pub strand: Option<String>,
}

impl QuizIdentity {
    pub fn new(grade: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            grade: grade.into(),
            subject: subject.into(),
            strand: None,
        }
    }

    pub fn with_strand(mut self, strand: impl Into<String>) -> Self {
        let strand = strand.into();
        self.strand = if strand.trim().is_empty() {
            None
        } else {
            Some(strand)
        };
        self
    }
}

impl fmt::Display for QuizIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.grade, self.subject)?;
        if let Some(strand) = &self.strand {
            write!(f, "/{strand}")?;
        }
        Ok(())
    }
}
