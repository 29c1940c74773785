use crate::summarizer::{extract_summary, SUMMARY_MAX_CHARS, SUMMARY_MAX_SENTENCES};
use crate::types::{Digest, NewsItem};
use chrono::{DateTime, Utc};
use console::style;

const WIDTH: usize = 90;

/// Summary text to print: the generated summary, or a short excerpt of the
/// raw description.
pub fn item_summary(item: &NewsItem) -> String {
    match &item.summary_generated {
        Some(summary) => summary.clone(),
        None => extract_summary(&item.summary_raw, SUMMARY_MAX_SENTENCES, SUMMARY_MAX_CHARS),
    }
}

/// Console rendering. With `color` off the output is plain text, which is
/// what gets printed when stdout is not a terminal.
pub fn render_text(digest: &Digest, color: bool) -> String {
    let paint = |text: String| style(text).force_styling(color);
    let mut out = String::new();
    let rule = "=".repeat(WIDTH);

    out.push_str(&format!("\n{}\n", paint(rule.clone()).cyan()));
    out.push_str(&format!(
        "{}\n",
        paint(format!("{:=^width$}", " NEWS DIGEST ", width = WIDTH)).cyan().bold()
    ));
    out.push_str(&format!("{}\n\n", paint(rule.clone()).cyan()));

    for (i, item) in digest.items.iter().enumerate() {
        out.push_str(&format!(
            "{}\n",
            paint(format!("< {}. {} >", i + 1, item.title)).yellow().bold()
        ));
        out.push_str(&format!("{}\n", paint("-".repeat(WIDTH)).cyan()));
        out.push_str(&format!("{}\n\n", item_summary(item)));
        out.push_str(&format!(
            "{}\n",
            paint(format!("Date: {}", item.published_at.to_rfc3339())).magenta()
        ));
        out.push_str(&format!(
            "{}\n",
            paint(format!("Source: {} ({})", item.source.name, item.source.category)).blue()
        ));
        out.push_str(&format!("{}\n\n", paint(format!("Link: {}", item.link)).green()));
        out.push_str(&format!("{}\n\n", paint(format!("<{}>", "=".repeat(WIDTH - 2))).cyan()));
    }

    if !digest.report.sources_failed.is_empty() {
        out.push_str(&format!(
            "{}\n",
            paint(format!(
                "Unavailable sources ({}/{}):",
                digest.report.sources_failed.len(),
                digest.report.sources_total
            ))
            .red()
        ));
        for failure in &digest.report.sources_failed {
            out.push_str(&format!("  - {}: {}\n", failure.name, failure.error));
        }
        out.push('\n');
    }

    out.push_str(&format!("{}\n", paint("End of digest.".to_string()).yellow()));
    out.push_str(&format!("{}\n", paint(rule).cyan()));
    out
}

pub fn render_markdown(digest: &Digest, generated_at: DateTime<Utc>) -> String {
    let mut lines = vec![format!(
        "# News digest ({})\n",
        generated_at.format("%d.%m.%Y %H:%M")
    )];

    for item in &digest.items {
        lines.push(format!("### {}\n", item.title));
        lines.push(format!("{}\n", item_summary(item)));
        lines.push(format!(
            "_{} • {}_  \n[{}]({})\n",
            item.published_at.to_rfc3339(),
            item.source.name,
            item.link,
            item.link
        ));
    }

    lines.join("\n")
}
