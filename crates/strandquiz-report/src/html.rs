//! HTML marking scheme.
//!
//! Produces a self-contained, printable HTML file with all CSS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use strandquiz_core::catalog::grade_label;
use strandquiz_core::report::StrandReport;

const NO_ANSWER: &str = "No Answer";
const NOT_AVAILABLE: &str = "N/A";

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Generate the marking scheme for one graded strand.
pub fn generate_html(report: &StrandReport) -> String {
    let mut html = String::new();
    let subject = title_case(&report.subject);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>{} Results: {}</title>\n",
        html_escape(&subject),
        html_escape(&report.strand)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str(&format!(
        "<h1>{} Quiz Results</h1>\n",
        html_escape(&subject)
    ));
    html.push_str(&format!(
        "<p class=\"meta\">{} | Strand: <strong>{}</strong> | {}</p>\n",
        html_escape(&grade_label(&report.grade)),
        html_escape(&report.strand),
        report.created_at.format("%Y-%m-%d")
    ));
    html.push_str("</header>\n");

    html.push_str("<section class=\"score\">\n");
    html.push_str(&format!(
        "<h2>Score: {} / {} ({:.0}%)</h2>\n",
        report.score,
        report.total,
        report.percentage()
    ));
    html.push_str(&score_bar(report.percentage()));
    html.push_str("</section>\n");

    html.push_str("<section class=\"breakdown\">\n");
    html.push_str("<h2>Marking Scheme</h2>\n");
    html.push_str("<table>\n");
    html.push_str("<thead><tr><th>#</th><th>Question</th><th>Your Answer</th><th>Correct Answer</th><th>Result</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for (i, item) in report.breakdown.iter().enumerate() {
        let (class, mark) = if item.is_correct {
            ("pass", "&#10003;")
        } else {
            ("fail", "&#10007;")
        };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"mark\">{}</td></tr>\n",
            class,
            i + 1,
            html_escape(&item.question),
            html_escape(item.user_answer.as_deref().unwrap_or(NO_ANSWER)),
            html_escape(item.correct_answer.as_deref().unwrap_or(NOT_AVAILABLE)),
            mark
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write the marking scheme to a file.
pub fn write_html_report(report: &StrandReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}

fn score_bar(percentage: f64) -> String {
    let max_width = 400.0;
    let width = (percentage / 100.0 * max_width).clamp(0.0, max_width);

    let color = if percentage >= 80.0 {
        "#22c55e"
    } else if percentage >= 50.0 {
        "#eab308"
    } else {
        "#ef4444"
    };

    format!(
        "<svg width=\"{max_width}\" height=\"24\" xmlns=\"http://www.w3.org/2000/svg\">\n  \
         <rect x=\"0\" y=\"0\" width=\"{max_width}\" height=\"24\" fill=\"var(--border)\" rx=\"4\"/>\n  \
         <rect x=\"0\" y=\"0\" width=\"{width:.0}\" height=\"24\" fill=\"{color}\" rx=\"4\"/>\n\
         </svg>\n"
    )
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
@media print { :root { --bg: #fff; --fg: #000; } }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 1.5rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; vertical-align: top; }
th { background: var(--border); }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.mark { text-align: center; font-weight: bold; }
svg { margin: 0.5rem 0; }
"#;
