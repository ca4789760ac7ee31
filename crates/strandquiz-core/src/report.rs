//! Strand report records with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{BreakdownItem, GradingResult, QuizIdentity};

/// File formats a strand report can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Html,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(ReportFormat::Html),
            "json" => Ok(ReportFormat::Json),
            other => anyhow::bail!("unknown report format '{other}' (expected html or json)"),
        }
    }
}

/// Everything an exporter needs to produce the record of one graded strand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub subject: String,
    pub grade: String,
    pub strand: String,
    pub score: u32,
    pub total: u32,
    pub breakdown: Vec<BreakdownItem>,
}

impl ExportRequest {
    pub fn new(identity: &QuizIdentity, strand: &str, result: &GradingResult) -> Self {
        Self {
            subject: identity.subject.clone(),
            grade: identity.grade.clone(),
            strand: strand.to_string(),
            score: result.score,
            total: result.total,
            breakdown: result.breakdown.clone(),
        }
    }
}

/// A downloadable record of one graded strand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrandReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub subject: String,
    pub grade: String,
    pub strand: String,
    pub score: u32,
    pub total: u32,
    pub breakdown: Vec<BreakdownItem>,
}

impl StrandReport {
    pub fn new(request: &ExportRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            subject: request.subject.clone(),
            grade: request.grade.clone(),
            strand: request.strand.clone(),
            score: request.score,
            total: request.total,
            breakdown: request.breakdown.clone(),
        }
    }

    /// Score as a percentage of the total.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.score) * 100.0 / f64::from(self.total)
        }
    }

    /// Base file name, e.g. `math_Counting_Numbers_Results`.
    pub fn file_stem(&self) -> String {
        format!(
            "{}_{}_Results",
            sanitize_file_component(&self.subject),
            sanitize_file_component(&self.strand)
        )
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: StrandReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

/// Keep ASCII letters, digits, `-` and `_`; everything else becomes `_`.
pub fn sanitize_file_component(s: &str) -> String {
    let cleaned: String = s
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned
    }
}
