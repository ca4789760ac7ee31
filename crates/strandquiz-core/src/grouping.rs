//! Strand grouping.
//!
//! Partitions a flat question list into ordered strands, optionally keeping
//! only the strand named by a URL-style filter.

use std::collections::{HashMap, HashSet};

use crate::model::{Question, Strand};

/// Normalize a strand name or filter for comparison: trimmed, lowercase,
/// hyphens read as spaces.
pub fn normalize_strand_name(name: &str) -> String {
    name.trim().to_lowercase().replace('-', " ")
}

/// Whether a question's strand matches a filter such as `"counting-numbers"`.
pub fn strand_matches(strand: &str, filter: &str) -> bool {
    normalize_strand_name(strand) == normalize_strand_name(filter)
}

/// Group questions into strands in first-seen order.
///
/// With a filter, questions whose declared strand does not match it are
/// dropped first; questions without a declared strand never match a filter.
/// A question id seen earlier in the list is dropped, so every id belongs to
/// exactly one strand. An empty result is the "no content" condition, not
/// an error.
pub fn group(questions: Vec<Question>, strand_filter: Option<&str>) -> Vec<Strand> {
    let mut strands: Vec<Strand> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut seen = HashSet::new();

    for question in questions {
        if let Some(filter) = strand_filter {
            let matches = question
                .declared_strand()
                .is_some_and(|strand| strand_matches(strand, filter));
            if !matches {
                continue;
            }
        }
        if !seen.insert(question.id().clone()) {
            tracing::warn!(id = %question.id(), strand = question.strand(), "dropping duplicate question id");
            continue;
        }

        match index.get(question.strand()) {
            Some(&i) => strands[i].questions.push(question),
            None => {
                index.insert(question.strand().to_string(), strands.len());
                strands.push(Strand {
                    name: question.strand().to_string(),
                    questions: vec![question],
                });
            }
        }
    }

    strands
}
