//! Question source backed by bank files on disk.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;

use strandquiz_core::bank::{bank_path, parse_bank_str};
use strandquiz_core::error::ServiceError;
use strandquiz_core::model::Question;
use strandquiz_core::traits::QuestionSource;

/// Reads `{dir}/{grade}/{subject}.json`.
///
/// A grade or subject with no bank file yields no questions; a missing
/// bank directory is an error.
pub struct FileQuestionSource {
    dir: PathBuf,
}

impl FileQuestionSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl QuestionSource for FileQuestionSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self, grade: &str, subject: &str) -> anyhow::Result<Vec<Question>> {
        let is_dir = tokio::fs::metadata(&self.dir)
            .await
            .is_ok_and(|meta| meta.is_dir());
        if !is_dir {
            return Err(ServiceError::NotFound(format!(
                "question bank directory {}",
                self.dir.display()
            ))
            .into());
        }

        let path = bank_path(&self.dir, grade, subject)?;
        let exists = tokio::fs::try_exists(&path)
            .await
            .with_context(|| format!("failed to check question bank: {}", path.display()))?;
        if !exists {
            tracing::debug!(path = %path.display(), "no bank file");
            return Ok(Vec::new());
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read question bank: {}", path.display()))?;
        parse_bank_str(&content, &path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_bank_for_grade_and_subject() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pp1")).unwrap();
        std::fs::write(
            dir.path().join("pp1").join("languages.json"),
            r#"[{"_id": "l1", "questionText": "Say a sound", "isTypeOpen": true, "strand": "Listening"}]"#,
        )
        .unwrap();

        let source = FileQuestionSource::new(dir.path());
        let questions = source.fetch("PP1", "Languages").await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].strand(), "Listening");
    }

    #[tokio::test]
    async fn missing_subject_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileQuestionSource::new(dir.path());
        assert!(source.fetch("3", "math").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileQuestionSource::new(dir.path().join("nope"));
        let err = source.fetch("3", "math").await.unwrap_err();
        assert!(err
            .downcast_ref::<ServiceError>()
            .is_some_and(ServiceError::is_permanent));
    }

    #[tokio::test]
    async fn directory_file_is_not_a_bank_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("banks.json");
        std::fs::write(&file, "[]").unwrap();

        let source = FileQuestionSource::new(&file);
        let err = source.fetch("3", "math").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn refuses_to_read_outside_bank_dir() {
        let root = tempfile::tempdir().unwrap();
        let banks = root.path().join("banks");
        std::fs::create_dir_all(&banks).unwrap();
        std::fs::write(
            root.path().join("secret.json"),
            r#"[{"_id": "s1", "questionText": "hidden"}]"#,
        )
        .unwrap();

        let source = FileQuestionSource::new(&banks);
        assert!(source.fetch("..", "secret").await.is_err());
    }

    #[tokio::test]
    async fn broken_bank_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("3")).unwrap();
        std::fs::write(dir.path().join("3").join("math.json"), "{").unwrap();

        let source = FileQuestionSource::new(dir.path());
        assert!(source.fetch("3", "math").await.is_err());
    }
}
