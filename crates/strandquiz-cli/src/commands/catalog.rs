//! The `strandquiz grades` and `strandquiz subjects` commands.

use anyhow::Result;
use comfy_table::{Cell, Table};

use strandquiz_core::catalog::{grade_label, subjects_for, GRADES};

pub fn grades() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Grade", "Label", "Subjects"]);

    for grade in GRADES {
        table.add_row(vec![
            Cell::new(grade),
            Cell::new(grade_label(grade)),
            Cell::new(subjects_for(grade).join(", ")),
        ]);
    }

    println!("{table}");
    Ok(())
}

pub fn subjects(grade: String) -> Result<()> {
    let grade = grade.trim();
    anyhow::ensure!(!grade.is_empty(), "grade must not be empty");

    println!("{}:", grade_label(grade));
    let address_grade = grade.to_lowercase();
    for subject in subjects_for(grade) {
        println!("  {subject:<24} /{address_grade}/{}", subject.to_lowercase());
    }
    Ok(())
}
