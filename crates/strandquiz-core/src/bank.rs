//! Question bank files.
//!
//! A bank is a JSON array of questions in the question service's wire
//! format. Banks on disk are laid out as `{dir}/{grade}/{subject}.json`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::{Question, DEFAULT_STRAND};

/// Parse a single JSON bank file.
pub fn parse_bank(path: &Path) -> Result<Vec<Question>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    parse_bank_str(&content, path)
}

/// Parse a JSON string into questions (useful for testing).
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<Vec<Question>> {
    serde_json::from_str(content)
        .with_context(|| format!("failed to parse JSON: {}", source_path.display()))
}

/// Where the bank for `grade`/`subject` lives under `dir`.
///
/// Both components are lowercased, matching the service's addressing.
/// Components that would leave `dir` are refused.
pub fn bank_path(dir: &Path, grade: &str, subject: &str) -> Result<PathBuf> {
    let grade = bank_component(grade)?;
    let subject = bank_component(subject)?;
    Ok(dir.join(grade).join(format!("{subject}.json")))
}

fn bank_component(raw: &str) -> Result<String> {
    let part = raw.trim().to_lowercase();
    if part.is_empty() || part == "." || part == ".." || part.contains(['/', '\\']) {
        anyhow::bail!("invalid question bank name '{raw}'");
    }
    Ok(part)
}

/// Recursively load all `.json` banks from a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<(PathBuf, Vec<Question>)>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "json") {
            match parse_bank(&path) {
                Ok(questions) => banks.push((path, questions)),
                Err(e) => {
                    tracing::warn!("skipping {}: {e:#}", path.display());
                }
            }
        }
    }

    Ok(banks)
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Check a bank for common authoring problems.
pub fn validate_bank(questions: &[Question]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    for q in questions {
        if !seen_ids.insert(q.id()) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id().to_string()),
                message: format!("duplicate question ID: {}", q.id()),
            });
        }
    }

    for q in questions {
        let question_id = Some(q.id().to_string());

        if q.text().trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: question_id.clone(),
                message: "question text is empty".into(),
            });
        }

        if !q.is_open_ended() && q.options().is_empty() {
            warnings.push(ValidationWarning {
                question_id: question_id.clone(),
                message: "multiple-choice question has no options".into(),
            });
        }

        if q.declared_strand().is_none() {
            warnings.push(ValidationWarning {
                question_id,
                message: format!("no strand given, grouped under \"{DEFAULT_STRAND}\""),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_JSON: &str = r#"[
        {
            "_id": "n1",
            "questionText": "Which word is a noun?",
            "options": ["run", "cat", "blue"],
            "isTypeOpen": false,
            "strand": "Nouns",
            "correctAnswer": "cat"
        },
        {
            "_id": "v1",
            "questionText": "Write a verb.",
            "isTypeOpen": true,
            "strand": "Verbs"
        }
    ]"#;

    #[test]
    fn parse_valid_bank() {
        let questions = parse_bank_str(VALID_JSON, Path::new("test.json")).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id().as_str(), "n1");
        assert_eq!(questions[0].options().len(), 3);
        assert!(questions[1].is_open_ended());
        assert!(validate_bank(&questions).is_empty());
    }

    #[test]
    fn parse_malformed_bank() {
        assert!(parse_bank_str("{ not json", Path::new("bad.json")).is_err());
    }

    #[test]
    fn validate_reports_problems() {
        let json = r#"[
            { "_id": "a", "questionText": "First", "isTypeOpen": false, "strand": "S" },
            { "_id": "a", "questionText": " ", "isTypeOpen": true, "strand": "S" },
            { "_id": "b", "questionText": "No strand", "isTypeOpen": true }
        ]"#;
        let questions = parse_bank_str(json, Path::new("t.json")).unwrap();
        let warnings = validate_bank(&questions);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
        assert!(warnings.iter().any(|w| w.message.contains("text is empty")));
        assert!(warnings.iter().any(|w| w.message.contains("no options")));
        assert!(warnings
            .iter()
            .any(|w| w.question_id.as_deref() == Some("b") && w.message.contains("General")));
    }

    #[test]
    fn bank_path_is_lowercased() {
        let path = bank_path(Path::new("banks"), "PP1", "Number Work").unwrap();
        assert_eq!(path, Path::new("banks/pp1/number work.json"));
    }

    #[test]
    fn bank_path_stays_inside_dir() {
        let dir = Path::new("banks");
        assert!(bank_path(dir, "..", "x").is_err());
        assert!(bank_path(dir, "5", "..").is_err());
        assert!(bank_path(dir, ".", "math").is_err());
        assert!(bank_path(dir, "5", "../secrets").is_err());
        assert!(bank_path(dir, "5", r"..\secrets").is_err());
        assert!(bank_path(dir, " ", "math").is_err());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        let grade_dir = dir.path().join("3");
        std::fs::create_dir_all(&grade_dir).unwrap();
        std::fs::write(grade_dir.join("english.json"), VALID_JSON).unwrap();
        std::fs::write(grade_dir.join("broken.json"), "nope").unwrap();
        std::fs::write(grade_dir.join("notes.txt"), "ignored").unwrap();

        let banks = load_bank_directory(dir.path()).unwrap();
        assert_eq!(banks.len(), 1);
        assert!(banks[0].0.ends_with("english.json"));
        assert_eq!(banks[0].1.len(), 2);
    }
}
