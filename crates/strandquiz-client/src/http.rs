//! HTTP client for the question and grading service.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use tracing::instrument;

use strandquiz_core::answers::AnswerSet;
use strandquiz_core::error::ServiceError;
use strandquiz_core::model::{GradingResult, Question};
use strandquiz_core::traits::{GradingClient, QuestionSource};

pub const DEFAULT_BASE_URL: &str = "https://histbooks.onrender.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Talks to `GET /questions/{grade}/{subject}` and `POST /grade-quiz`.
pub struct HttpQuizClient {
    base_url: Url,
    timeout_secs: u64,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GradeRequest<'a> {
    answers: &'a AnswerSet,
}

impl HttpQuizClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let base = if base_url.trim().is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url.trim()
        };
        let base_url =
            Url::parse(base).with_context(|| format!("invalid service URL '{base}'"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("service URL '{base}' cannot have a path");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url,
            timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn send_error(&self, e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            ServiceError::Network(format!(
                "question service not reachable at {}",
                self.base_url
            ))
        } else {
            ServiceError::Network(e.to_string())
        }
    }

    async fn read_body(response: reqwest::Response, what: &str) -> Result<String, ServiceError> {
        let status = response.status().as_u16();
        if status == 404 {
            return Err(ServiceError::NotFound(what.to_string()));
        }
        if status >= 400 {
            let message = response.text().await.unwrap_or_default();
            return Err(ServiceError::Api { status, message });
        }
        response
            .text()
            .await
            .map_err(|e| ServiceError::Malformed(format!("failed to read response: {e}")))
    }
}

#[async_trait]
impl QuestionSource for HttpQuizClient {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self))]
    async fn fetch(&self, grade: &str, subject: &str) -> anyhow::Result<Vec<Question>> {
        let url = self.endpoint(&["questions", grade, subject]);
        tracing::debug!(%url, "fetching questions");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        let body =
            Self::read_body(response, &format!("questions for {grade}/{subject}")).await?;
        let questions: Vec<Question> = serde_json::from_str(&body)
            .map_err(|e| ServiceError::Malformed(format!("failed to parse questions: {e}")))?;

        tracing::debug!(count = questions.len(), "questions received");
        Ok(questions)
    }
}

#[async_trait]
impl GradingClient for HttpQuizClient {
    #[instrument(skip(self, answers), fields(answered = answers.len()))]
    async fn submit(&self, answers: &AnswerSet) -> anyhow::Result<GradingResult> {
        let response = self
            .client
            .post(self.endpoint(&["grade-quiz"]))
            .json(&GradeRequest { answers })
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        let body = Self::read_body(response, "grading endpoint").await?;
        let result: GradingResult = serde_json::from_str(&body)
            .map_err(|e| ServiceError::Malformed(format!("failed to parse grading result: {e}")))?;

        Ok(result)
    }
}
