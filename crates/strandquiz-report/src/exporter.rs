//! Writes strand reports to an output directory.

use std::path::{Path, PathBuf};

use anyhow::Result;

use strandquiz_core::report::{ExportRequest, ReportFormat, StrandReport};
use strandquiz_core::traits::ReportExporter;

use crate::html::write_html_report;

/// Exports each graded strand as `{subject}_{strand}_Results.{ext}`.
pub struct FileExporter {
    output_dir: PathBuf,
    formats: Vec<ReportFormat>,
}

impl FileExporter {
    pub fn new(output_dir: impl Into<PathBuf>, formats: Vec<ReportFormat>) -> Self {
        Self {
            output_dir: output_dir.into(),
            formats,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `report` in every configured format.
    pub fn write(&self, report: &StrandReport) -> Result<Vec<PathBuf>> {
        let stem = report.file_stem();
        let mut written = Vec::with_capacity(self.formats.len());

        for format in &self.formats {
            let path = self
                .output_dir
                .join(format!("{stem}.{}", format.extension()));
            match format {
                ReportFormat::Html => write_html_report(report, &path)?,
                ReportFormat::Json => report.save_json(&path)?,
            }
            tracing::debug!(path = %path.display(), %format, "report written");
            written.push(path);
        }

        Ok(written)
    }
}

impl ReportExporter for FileExporter {
    fn export(&self, request: &ExportRequest) -> Result<Vec<PathBuf>> {
        self.write(&StrandReport::new(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strandquiz_core::model::{BreakdownItem, GradingResult, QuizIdentity};

    fn request() -> ExportRequest {
        let result = GradingResult::new(
            1,
            1,
            vec![BreakdownItem {
                question: "2 + 2".into(),
                user_answer: Some("4".into()),
                correct_answer: Some("4".into()),
                is_correct: true,
            }],
        )
        .unwrap();
        ExportRequest::new(&QuizIdentity::new("5", "math"), "Counting Numbers", &result)
    }

    #[test]
    fn writes_every_format() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = FileExporter::new(dir.path(), vec![ReportFormat::Html, ReportFormat::Json]);

        let paths = exporter.export(&request()).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0], dir.path().join("math_Counting_Numbers_Results.html"));
        assert_eq!(paths[1], dir.path().join("math_Counting_Numbers_Results.json"));

        let loaded = StrandReport::load_json(&paths[1]).unwrap();
        assert_eq!(loaded.score, 1);
        assert_eq!(loaded.strand, "Counting Numbers");
    }

    #[test]
    fn unwritable_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let exporter = FileExporter::new(blocker.join("reports"), vec![ReportFormat::Html]);
        assert!(exporter.export(&request()).is_err());
    }
}
