//! The `strandquiz strands` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use strandquiz_client::create_services;
use strandquiz_core::catalog::{grade_label, parse_path};
use strandquiz_core::controller::empty_state_guidance;
use strandquiz_core::grouping::group;

use crate::ServiceArgs;

pub async fn execute(path: String, service: ServiceArgs) -> Result<()> {
    let config = super::load_config(&service)?;
    let identity = parse_path(&path)?;
    let services = create_services(&config)?;

    let questions = services
        .questions
        .fetch(&identity.grade, &identity.subject)
        .await?;
    let strands = group(questions, identity.strand.as_deref());

    if strands.is_empty() {
        println!("{}", empty_state_guidance(&identity));
        return Ok(());
    }

    println!(
        "{} {} ({} strands)",
        grade_label(&identity.grade),
        identity.subject,
        strands.len()
    );

    let mut table = Table::new();
    table.set_header(vec!["#", "Strand", "Questions", "Open-ended"]);
    for (i, strand) in strands.iter().enumerate() {
        let open = strand.questions.iter().filter(|q| q.is_open_ended()).count();
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&strand.name),
            Cell::new(strand.questions.len()),
            Cell::new(open),
        ]);
    }
    println!("{table}");

    Ok(())
}
