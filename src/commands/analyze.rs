use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::analysis::{analyze_text, title_case, AnalysisConfig, KeywordReport};
use crate::pdf::text::extract_document_text;

/// Extract the text of `input`, save it to `text_output` and count keywords.
pub fn analyze(input: &Path, text_output: &Path, config: &AnalysisConfig) -> Result<KeywordReport> {
    if !input.exists() {
        anyhow::bail!(
            "Could not find {}. Run the combine step first!",
            input.display()
        );
    }

    let text = extract_document_text(input)?;
    let full_text = text.joined();
    let report = analyze_text(&full_text, text.page_count, config);
    info!(
        pages = report.pages_scanned,
        words = report.total_words,
        "analyzed text"
    );

    std::fs::write(text_output, &full_text)
        .with_context(|| format!("Failed to write text: {}", text_output.display()))?;

    Ok(report)
}

pub fn save_json(report: &KeywordReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write keyword report: {}", path.display()))
}

pub fn load_json(path: &Path) -> Result<KeywordReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read keyword report: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid keyword report: {}", path.display()))
}

pub fn run(
    input: &Path,
    text_output: &Path,
    json: Option<&Path>,
    config: &AnalysisConfig,
) -> Result<()> {
    let report = analyze(input, text_output, config)?;

    let rule = "=".repeat(40);
    println!("{}", rule);
    println!("AUTOMATED ANALYSIS REPORT");
    println!("{}", rule);
    println!("Total Pages Scanned: {}", report.pages_scanned);
    println!("Total Words Counted: {}", report.total_words);
    println!("{}", "-".repeat(30));
    println!("TOP {} KEYWORDS (Subject Matter Hints):", config.top_keywords);
    for keyword in &report.top_keywords {
        println!(" • {}: {} times", title_case(&keyword.word), keyword.count);
    }
    println!("{}", rule);

    if let Some(path) = json {
        save_json(&report, path)?;
        println!("Keyword report saved to {}", path.display());
    }

    println!("Full text extracted to {}", text_output.display());

    Ok(())
}
