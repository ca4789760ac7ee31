//! The `strandquiz init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("strandquiz.toml").exists() {
        println!("strandquiz.toml already exists, skipping.");
    } else {
        std::fs::write("strandquiz.toml", SAMPLE_CONFIG)?;
        println!("Created strandquiz.toml");
    }

    std::fs::create_dir_all("question-banks/5")?;
    let example_path = Path::new("question-banks/5/math.json");
    if example_path.exists() {
        println!("question-banks/5/math.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BANK)?;
        println!("Created question-banks/5/math.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit strandquiz.toml to point at your question service");
    println!("  2. Run: strandquiz validate --bank question-banks");
    println!("  3. Run: strandquiz take /5/math --questions-dir question-banks");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# strandquiz configuration

# STRANDQUIZ_API_URL overrides this.
api_base_url = "https://histbooks.onrender.com"
timeout_secs = 30
output_dir = "./strandquiz-reports"
report_formats = ["html", "json"]

# Serve questions from local bank files instead of the service.
# questions_dir = "question-banks"
"#;

const EXAMPLE_BANK: &str = r#"[
  {
    "_id": "cn-1",
    "questionText": "Which number comes after 19?",
    "options": ["18", "20", "21"],
    "isTypeOpen": false,
    "strand": "Counting Numbers"
  },
  {
    "_id": "cn-2",
    "questionText": "Write the number eleven in figures.",
    "isTypeOpen": true,
    "strand": "Counting Numbers"
  },
  {
    "_id": "add-1",
    "questionText": "What is 7 + 8?",
    "options": ["14", "15", "16"],
    "isTypeOpen": false,
    "strand": "Addition"
  }
]
"#;
