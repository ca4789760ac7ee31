//! Grades, their subjects, and path-style quiz addressing.

use anyhow::Result;

use crate::model::QuizIdentity;

/// Grades offered, in display order.
pub const GRADES: &[&str] = &[
    "Playgroup", "PP1", "PP2", "1", "2", "3", "4", "5", "6", "7", "8", "9",
];

const EARLY_YEARS: &[&str] = &["Playgroup", "PP1", "PP2"];
const EARLY_YEARS_SUBJECTS: &[&str] = &["Languages", "Number Work"];
const DEFAULT_SUBJECTS: &[&str] = &[
    "English",
    "Kiswahili",
    "Math",
    "Environmental Science",
    "Pre-Tech",
    "CRE",
    "SST",
    "Integrated Science",
];

fn is_numeric(grade: &str) -> bool {
    !grade.is_empty() && grade.chars().all(|c| c.is_ascii_digit())
}

/// Subjects offered for a grade. Unknown grades get the standard list.
pub fn subjects_for(grade: &str) -> &'static [&'static str] {
    let grade = grade.trim();
    if EARLY_YEARS.iter().any(|g| g.eq_ignore_ascii_case(grade)) {
        EARLY_YEARS_SUBJECTS
    } else {
        DEFAULT_SUBJECTS
    }
}

/// The subject a grade opens on, in addressing form (lowercase).
pub fn default_subject(grade: &str) -> Option<String> {
    subjects_for(grade).first().map(|s| s.to_lowercase())
}

/// `"Grade 5"` for numeric grades, the grade name otherwise.
pub fn grade_label(grade: &str) -> String {
    if is_numeric(grade) {
        format!("Grade {grade}")
    } else {
        grade.to_string()
    }
}

/// Whether `subject` (any case) is offered for `grade`.
pub fn offers_subject(grade: &str, subject: &str) -> bool {
    subjects_for(grade)
        .iter()
        .any(|s| s.eq_ignore_ascii_case(subject.trim()))
}

/// Parse `/:grade[/:subject[/:strand]]` into a quiz identity.
///
/// The grade is lowercased as in the site's addresses; a missing subject is
/// filled with the grade's default subject.
pub fn parse_path(path: &str) -> Result<QuizIdentity> {
    let mut parts = path.split('/').filter(|p| !p.trim().is_empty());
    if let Some(dots) = path.split('/').map(str::trim).find(|p| *p == "." || *p == "..") {
        anyhow::bail!("path segment '{dots}' is not allowed in '{path}'");
    }

    let Some(grade) = parts.next() else {
        anyhow::bail!("path '{path}' does not name a grade");
    };
    let grade = grade.trim().to_lowercase();

    let subject = match parts.next() {
        Some(s) => s.trim().to_lowercase(),
        None => default_subject(&grade)
            .ok_or_else(|| anyhow::anyhow!("grade '{grade}' has no subjects"))?,
    };

    let mut identity = QuizIdentity::new(grade, subject);
    if let Some(strand) = parts.next() {
        identity = identity.with_strand(strand.trim());
    }
    if let Some(extra) = parts.next() {
        anyhow::bail!("unexpected path segment '{extra}' in '{path}'");
    }
    Ok(identity)
}
