//! strandquiz CLI: take strand-by-strand quizzes from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "strandquiz", version, about = "Strand-by-strand quiz sessions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where questions and grading come from.
#[derive(Args, Clone, Default)]
pub struct ServiceArgs {
    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Question and grading service URL (overrides config)
    #[arg(long)]
    api_url: Option<String>,

    /// Read questions from a bank directory instead of the service
    #[arg(long)]
    questions_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a quiz, e.g. `strandquiz take /5/math/counting-numbers`
    Take {
        /// Quiz address: /grade[/subject[/strand]]
        path: String,

        #[command(flatten)]
        service: ServiceArgs,

        /// Output directory for strand reports
        #[arg(long)]
        output: Option<PathBuf>,

        /// Report formats: html, json (comma-separated)
        #[arg(long)]
        format: Option<String>,
    },

    /// List the strands of a quiz without taking it
    Strands {
        /// Quiz address: /grade[/subject[/strand]]
        path: String,

        #[command(flatten)]
        service: ServiceArgs,
    },

    /// List grades
    Grades,

    /// List the subjects offered for a grade
    Subjects {
        grade: String,
    },

    /// Validate question bank files
    Validate {
        /// Path to a bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// Create starter config and an example question bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("strandquiz=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            path,
            service,
            output,
            format,
        } => commands::take::execute(path, service, output, format).await,
        Commands::Strands { path, service } => commands::strands::execute(path, service).await,
        Commands::Grades => commands::catalog::grades(),
        Commands::Subjects { grade } => commands::catalog::subjects(grade),
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
