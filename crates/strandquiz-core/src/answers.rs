//! Learner answer capture.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::model::QuestionId;

/// Answers sent to the grading service, keyed by question id.
///
/// Ordered so the same answers always serialize to the same payload.
pub type AnswerSet = BTreeMap<QuestionId, String>;

/// Answers recorded by the learner during a session.
///
/// Absence of an entry means the question is unanswered. Values are stored
/// as given; correctness is decided by the grading service alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnswerStore {
    answers: HashMap<QuestionId, String>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record or overwrite the answer for a question.
    pub fn set(&mut self, id: QuestionId, value: impl Into<String>) {
        self.answers.insert(id, value.into());
    }

    pub fn get(&self, id: &QuestionId) -> Option<&str> {
        self.answers.get(id).map(String::as_str)
    }

    /// True if at least one of `ids` has a non-empty answer.
    pub fn has_any<'a>(&self, ids: impl IntoIterator<Item = &'a QuestionId>) -> bool {
        ids.into_iter()
            .any(|id| self.answers.get(id).is_some_and(|v| !v.is_empty()))
    }

    /// The non-empty answers for `ids` only.
    pub fn answers_for<'a>(&self, ids: impl IntoIterator<Item = &'a QuestionId>) -> AnswerSet {
        ids.into_iter()
            .filter_map(|id| {
                self.answers
                    .get(id)
                    .filter(|v| !v.is_empty())
                    .map(|v| (id.clone(), v.clone()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }
}
