//! The `strandquiz take` command.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use strandquiz_client::create_services;
use strandquiz_core::catalog::{grade_label, parse_path};
use strandquiz_core::controller::{Notice, NoticeLevel, NoticeSink, QuizController};
use strandquiz_core::model::{GradingResult, Question, Strand};
use strandquiz_core::report::ReportFormat;
use strandquiz_core::session::{Phase, SessionEvent};
use strandquiz_report::FileExporter;

use crate::ServiceArgs;

/// Prints notices to stderr.
struct ConsoleNotices;

impl NoticeSink for ConsoleNotices {
    fn notify(&self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Error => eprintln!("  ERROR: {}", notice.message),
            NoticeLevel::Success => eprintln!("  {}", notice.message),
            NoticeLevel::Info => eprintln!("  Note: {}", notice.message),
        }
    }
}

pub async fn execute(
    path: String,
    service: ServiceArgs,
    output: Option<PathBuf>,
    format: Option<String>,
) -> Result<()> {
    let config = super::load_config(&service)?;
    let identity = parse_path(&path)?;

    let formats = match &format {
        Some(f) => parse_formats(f)?,
        None => config.report_formats.clone(),
    };
    anyhow::ensure!(!formats.is_empty(), "at least one report format is required");
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let services = create_services(&config)?;
    let exporter = Arc::new(FileExporter::new(output, formats));
    let mut ctl = QuizController::new(services.questions, services.grader, exporter)
        .with_notices(Arc::new(ConsoleNotices));

    eprintln!(
        "strandquiz v{}: {} {}",
        env!("CARGO_PKG_VERSION"),
        grade_label(&identity.grade),
        identity.subject
    );

    match ctl.load(identity).await {
        SessionEvent::Presenting { .. } => {}
        SessionEvent::NoQuestions(_) => return Ok(()),
        SessionEvent::FetchFailed { message, .. } => {
            anyhow::bail!("could not load questions: {message}")
        }
        other => anyhow::bail!("unexpected session event: {other:?}"),
    }

    let stdin = std::io::stdin();
    run_session(&mut ctl, stdin.lock()).await
}

fn parse_formats(s: &str) -> Result<Vec<ReportFormat>> {
    s.split(',')
        .filter(|f| !f.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Drive a loaded session to completion, reading answers line by line.
async fn run_session(ctl: &mut QuizController, input: impl BufRead) -> Result<()> {
    let mut lines = input.lines();

    loop {
        match ctl.state().phase() {
            Phase::Presenting => {
                let Some(strand) = ctl.state().current_strand().cloned() else {
                    anyhow::bail!("no strand to present");
                };
                if let Some(progress) = ctl.state().progress() {
                    println!(
                        "\n== Strand {}/{}: {} ({:.0}%) ==",
                        progress.position,
                        progress.total,
                        strand.name,
                        progress.fraction() * 100.0
                    );
                }

                if !ask_strand(ctl, &strand, &mut lines)? {
                    let _ = ctl.leave();
                    println!("\nQuiz abandoned.");
                    return Ok(());
                }

                match ctl.submit().await {
                    SessionEvent::Graded(_) => {
                        if let Some(result) = ctl.state().last_result() {
                            print_result(result);
                        }
                        for path in ctl.last_export().unwrap_or_default() {
                            println!("Report saved to: {}", path.display());
                        }
                    }
                    SessionEvent::ValidationFailed { .. } | SessionEvent::SubmissionFailed { .. } => {}
                    SessionEvent::Rejected(rejection) => anyhow::bail!(rejection),
                    other => anyhow::bail!("unexpected session event: {other:?}"),
                }
            }
            Phase::ShowingResult => {
                if !ctl.state().is_last_strand() {
                    println!("\nPress Enter for the next strand.");
                    if next_line(&mut lines)?.is_none() {
                        println!("\nQuiz abandoned.");
                        return Ok(());
                    }
                }
                let _ = ctl.advance();
            }
            Phase::Completed => {
                println!("\nAll {} strands completed.", ctl.state().strands().len());
                return Ok(());
            }
            phase => anyhow::bail!("session stopped while {phase}"),
        }
    }
}

/// Ask every question of `strand`. Returns `false` if input ran out.
fn ask_strand(
    ctl: &mut QuizController,
    strand: &Strand,
    lines: &mut impl Iterator<Item = std::io::Result<String>>,
) -> Result<bool> {
    for (i, question) in strand.questions.iter().enumerate() {
        println!("\n{}. {}", i + 1, question.text());
        for (n, option) in question.options().iter().enumerate() {
            println!("   {}) {}", n + 1, option);
        }
        if let Some(current) = ctl.state().answers().get(question.id()) {
            println!("   [current answer: {current}]");
        }
        print!("> ");
        std::io::Write::flush(&mut std::io::stdout()).ok();

        let Some(line) = next_line(lines)? else {
            return Ok(false);
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = ctl.answer(question.id().clone(), resolve_answer(question, line));
    }
    Ok(true)
}

fn next_line(lines: &mut impl Iterator<Item = std::io::Result<String>>) -> Result<Option<String>> {
    lines
        .next()
        .transpose()
        .context("failed to read answer")
}

/// Map an option number to its text for multiple-choice questions.
fn resolve_answer(question: &Question, input: &str) -> String {
    if question.is_open_ended() {
        return input.to_string();
    }
    input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|n| question.options().get(n))
        .cloned()
        .unwrap_or_else(|| input.to_string())
}

fn print_result(result: &GradingResult) {
    println!(
        "\nScore: {} / {} ({:.0}%)",
        result.score,
        result.total,
        result.ratio() * 100.0
    );

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Your Answer", "Correct Answer", "Result"]);
    for (i, item) in result.breakdown.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&item.question),
            Cell::new(item.user_answer.as_deref().unwrap_or("No Answer")),
            Cell::new(item.correct_answer.as_deref().unwrap_or("N/A")),
            Cell::new(if item.is_correct { "Correct" } else { "Wrong" }),
        ]);
    }
    println!("{table}");
}
