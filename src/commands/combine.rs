use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::pdf::merge::{load_source, Binder, SourceOutcome};
use crate::pdf::sources::discover;
use crate::pdf::PdfDocument;
use crate::toc::{paginate, provisional_entries, Base14Metrics, ChapterEntry};

/// One input file and what happened to it.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub path: PathBuf,
    pub title: String,
    #[serde(flatten)]
    pub outcome: SourceOutcome,
}

/// Summary of a `combine` run.
#[derive(Debug, Clone, Serialize)]
pub struct CombineReport {
    pub output: PathBuf,
    pub sources: Vec<SourceReport>,
    pub toc_pages: u32,
    pub body_pages: u32,
    pub entries: Vec<ChapterEntry>,
}

impl CombineReport {
    pub fn total_pages(&self) -> u32 {
        self.toc_pages + self.body_pages
    }
}

/// Merge the PDFs in `dir` into `output`.
pub fn combine(
    dir: &Path,
    output: &Path,
    config: &PipelineConfig,
    show_progress: bool,
) -> Result<CombineReport> {
    let exclude = output.file_name().map(|n| n.to_string_lossy().into_owned());
    let sources = discover(dir, exclude.as_deref())?;
    if sources.is_empty() {
        anyhow::bail!("No PDF files found in {}", dir.display());
    }
    info!(count = sources.len(), dir = %dir.display(), "found PDFs");

    let progress = if show_progress {
        let bar = ProgressBar::new(sources.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{pos}/{len}] {bar:40.cyan/blue} {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("=>-"),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let mut binder = Binder::new();
    let mut reports = Vec::with_capacity(sources.len());

    for source in sources {
        progress.set_message(
            source
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );

        let outcome = match load_source(&source.path) {
            Ok(doc) => SourceOutcome::Merged {
                pages: binder.append(doc),
            },
            Err(outcome) => outcome,
        };
        match &outcome {
            SourceOutcome::Merged { pages } => {
                info!(path = %source.path.display(), pages, "merged")
            }
            SourceOutcome::Skipped { reason } => {
                warn!(path = %source.path.display(), %reason, "skipped")
            }
            SourceOutcome::Failed { reason } => {
                warn!(path = %source.path.display(), %reason, "failed")
            }
        }

        reports.push(SourceReport {
            path: source.path,
            title: source.title,
            outcome,
        });
        progress.inc(1);
    }
    progress.finish_and_clear();

    let provisional = provisional_entries(reports.iter().filter_map(|r| match r.outcome {
        SourceOutcome::Merged { pages } => Some((r.title.clone(), pages)),
        _ => None,
    }));
    if provisional.is_empty() {
        anyhow::bail!("No valid pages were added from {}", dir.display());
    }

    let pagination = paginate(provisional, &config.toc, &Base14Metrics)?;
    info!(toc_pages = pagination.toc_pages(), "laid out table of contents");

    let body_pages = binder.body_pages();
    let mut document = binder.finish(&pagination, &config.toc)?;
    PdfDocument::save(&mut document, output)?;

    Ok(CombineReport {
        output: output.to_path_buf(),
        sources: reports,
        toc_pages: pagination.toc_pages(),
        body_pages,
        entries: pagination.entries,
    })
}

pub fn run(dir: &Path, output: Option<&Path>, config: &PipelineConfig) -> Result<()> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.join(&config.files.combined));

    let report = combine(dir, &output, config, true)?;

    for source in &report.sources {
        let name = source
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match &source.outcome {
            SourceOutcome::Merged { pages } => println!("  merged   {} ({} pages)", name, pages),
            SourceOutcome::Skipped { reason } => println!("  skipped  {} ({})", name, reason),
            SourceOutcome::Failed { reason } => println!("  failed   {} ({})", name, reason),
        }
    }

    println!(
        "Combined {} file(s) into {} ({} pages, {} of table of contents)",
        report.entries.len(),
        report.output.display(),
        report.total_pages(),
        report.toc_pages
    );

    Ok(())
}
