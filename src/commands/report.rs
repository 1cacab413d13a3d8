use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::commands::analyze::load_json;
use crate::report::ReportContent;

/// Write the report to `output`, taking page and word counts from `analysis` when given.
pub fn generate(output: &Path, analysis: Option<&Path>) -> Result<ReportContent> {
    let mut content = ReportContent::default();
    if let Some(path) = analysis {
        let stats = load_json(path)?;
        info!(
            pages = stats.pages_scanned,
            words = stats.total_words,
            "using measured statistics"
        );
        content = content.with_statistics(&stats);
    }

    content.save(output)?;
    Ok(content)
}

pub fn run(output: &Path, analysis: Option<&Path>) -> Result<()> {
    generate(output, analysis)?;
    println!("Success! Report saved as: {}", output.display());
    Ok(())
}
