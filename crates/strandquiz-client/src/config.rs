//! Service configuration and factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use strandquiz_core::report::ReportFormat;
use strandquiz_core::traits::{GradingClient, QuestionSource};

use crate::file::FileQuestionSource;
use crate::http::{HttpQuizClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Environment variable that overrides `api_base_url`.
pub const API_URL_ENV: &str = "STRANDQUIZ_API_URL";

/// Top-level strandquiz configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Base URL of the question and grading service.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Where strand reports are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Formats written for each graded strand.
    #[serde(default = "default_report_formats")]
    pub report_formats: Vec<ReportFormat>,
    /// Serve questions from bank files instead of the service.
    #[serde(default)]
    pub questions_dir: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./strandquiz-reports")
}
fn default_report_formats() -> Vec<ReportFormat> {
    vec![ReportFormat::Html]
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout(),
            output_dir: default_output_dir(),
            report_formats: default_report_formats(),
            questions_dir: None,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
pub fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `strandquiz.toml` in the current directory
/// 2. `~/.config/strandquiz/config.toml`
///
/// `STRANDQUIZ_API_URL` overrides the service URL from either file.
pub fn load_config() -> Result<QuizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("strandquiz.toml");
            if local.exists() {
                Some(local)
            } else {
                config_dir()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizConfig::default(),
    };

    if let Ok(url) = std::env::var(API_URL_ENV) {
        config.api_base_url = url;
    }

    config.api_base_url = resolve_env_vars(&config.api_base_url);
    config.output_dir = resolve_path(&config.output_dir);
    config.questions_dir = config.questions_dir.as_deref().map(resolve_path);

    Ok(config)
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("strandquiz"))
}

/// The question source and grading client a config describes.
pub struct QuizServices {
    pub questions: Arc<dyn QuestionSource>,
    pub grader: Arc<dyn GradingClient>,
}

/// Build the collaborators for a session.
///
/// Grading always goes to the service; questions come from the bank
/// directory when one is configured.
pub fn create_services(config: &QuizConfig) -> Result<QuizServices> {
    let client = Arc::new(HttpQuizClient::new(
        &config.api_base_url,
        config.timeout_secs,
    )?);

    let questions: Arc<dyn QuestionSource> = match &config.questions_dir {
        Some(dir) => Arc::new(FileQuestionSource::new(dir)),
        None => client.clone(),
    };

    Ok(QuizServices {
        questions,
        grader: client,
    })
}
