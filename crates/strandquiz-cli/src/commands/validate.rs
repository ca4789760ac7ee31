//! The `strandquiz validate` command.

use std::path::PathBuf;

use anyhow::Result;

use strandquiz_core::bank::{load_bank_directory, parse_bank, validate_bank};
use strandquiz_core::grouping::group;

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let banks = if bank_path.is_dir() {
        load_bank_directory(&bank_path)?
    } else {
        vec![(bank_path.clone(), parse_bank(&bank_path)?)]
    };

    anyhow::ensure!(
        !banks.is_empty(),
        "no question banks found in {}",
        bank_path.display()
    );

    let mut total_warnings = 0;

    for (path, questions) in &banks {
        let strand_count = group(questions.clone(), None).len();
        println!(
            "Bank: {} ({} questions, {} strands)",
            path.display(),
            questions.len(),
            strand_count
        );

        let warnings = validate_bank(questions);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All question banks valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
