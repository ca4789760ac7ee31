//! Mock question and grading service for testing.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use strandquiz_core::answers::AnswerSet;
use strandquiz_core::error::ServiceError;
use strandquiz_core::model::{BreakdownItem, GradingResult, Question};
use strandquiz_core::traits::{GradingClient, QuestionSource};

/// An in-memory stand-in for the quiz service.
///
/// Serves a fixed question list for every grade and subject and grades
/// answers against each question's `correct_answer`, ignoring case and
/// surrounding whitespace.
pub struct MockQuizService {
    questions: Vec<Question>,
    fail_fetch: AtomicBool,
    fail_submit: AtomicBool,
    fetch_count: AtomicU32,
    submit_count: AtomicU32,
    last_fetch: Mutex<Option<(String, String)>>,
    last_answers: Mutex<Option<AnswerSet>>,
}

impl MockQuizService {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            fail_fetch: AtomicBool::new(false),
            fail_submit: AtomicBool::new(false),
            fetch_count: AtomicU32::new(0),
            submit_count: AtomicU32::new(0),
            last_fetch: Mutex::new(None),
            last_answers: Mutex::new(None),
        }
    }

    /// Make subsequent fetches fail (or succeed again).
    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::Relaxed);
    }

    /// Make subsequent submissions fail (or succeed again).
    pub fn set_fail_submit(&self, fail: bool) {
        self.fail_submit.store(fail, Ordering::Relaxed);
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }

    pub fn submit_count(&self) -> u32 {
        self.submit_count.load(Ordering::Relaxed)
    }

    /// The grade and subject of the last fetch.
    pub fn last_fetch(&self) -> Option<(String, String)> {
        self.last_fetch
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The payload of the last submission.
    pub fn last_answers(&self) -> Option<AnswerSet> {
        self.last_answers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn grade(&self, answers: &AnswerSet) -> anyhow::Result<GradingResult> {
        let breakdown: Vec<BreakdownItem> = self
            .questions
            .iter()
            .filter_map(|q| {
                let answer = answers.get(q.id())?;
                let is_correct = q
                    .correct_answer()
                    .is_some_and(|c| c.trim().eq_ignore_ascii_case(answer.trim()));
                Some(BreakdownItem {
                    question: q.text().to_string(),
                    user_answer: Some(answer.clone()),
                    correct_answer: q.correct_answer().map(str::to_string),
                    is_correct,
                })
            })
            .collect();

        let score = breakdown.iter().filter(|b| b.is_correct).count() as u32;
        let total = breakdown.len() as u32;
        Ok(GradingResult::new(score, total, breakdown)?)
    }
}

#[async_trait]
impl QuestionSource for MockQuizService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, grade: &str, subject: &str) -> anyhow::Result<Vec<Question>> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        *self.last_fetch.lock().unwrap_or_else(|e| e.into_inner()) =
            Some((grade.to_string(), subject.to_string()));

        if self.fail_fetch.load(Ordering::Relaxed) {
            return Err(ServiceError::Api {
                status: 503,
                message: "mock fetch failure".into(),
            }
            .into());
        }
        Ok(self.questions.clone())
    }
}

#[async_trait]
impl GradingClient for MockQuizService {
    async fn submit(&self, answers: &AnswerSet) -> anyhow::Result<GradingResult> {
        self.submit_count.fetch_add(1, Ordering::Relaxed);
        *self.last_answers.lock().unwrap_or_else(|e| e.into_inner()) = Some(answers.clone());

        if self.fail_submit.load(Ordering::Relaxed) {
            return Err(ServiceError::Api {
                status: 500,
                message: "mock grading failure".into(),
            }
            .into());
        }
        self.grade(answers)
    }
}
