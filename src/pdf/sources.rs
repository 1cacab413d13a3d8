use anyhow::{Context, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

use crate::analysis::title_case;

static FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// A PDF found in the input directory, in merge order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePdf {
    pub path: PathBuf,
    pub title: String,
}

/// Files whose stem contains a number sort first, by that number; the rest
/// follow alphabetically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Numbered(Number, String),
    Unnumbered(String),
}

/// A run of decimal digits of any length, compared by value.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Number(String);

impl Number {
    fn new(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        Number(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn sort_key(stem: &str) -> SortKey {
    let lower = stem.to_lowercase();
    match FIRST_NUMBER.find(stem) {
        Some(m) => SortKey::Numbered(Number::new(m.as_str()), lower),
        None => SortKey::Unnumbered(lower),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Compare two paths in merge order.
pub fn merge_order(a: &Path, b: &Path) -> Ordering {
    sort_key(&file_stem(a)).cmp(&sort_key(&file_stem(b)))
}

/// `"intro_to_gen_ai"` becomes `"Intro To Gen Ai"`.
pub fn chapter_title(stem: &str) -> String {
    title_case(&stem.replace('_', " "))
}

/// List the PDFs directly inside `dir`, skipping `exclude` (the output file
/// of a previous run), sorted into merge order.
pub fn discover<P: AsRef<Path>>(dir: P, exclude: Option<&str>) -> Result<Vec<SourcePdf>> {
    let dir = dir.as_ref();
    let mut paths = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry =
            entry.with_context(|| format!("Failed to read directory: {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        let excluded = exclude.is_some_and(|name| {
            path.file_name()
                .is_some_and(|file_name| file_name.to_string_lossy() == name)
        });
        if is_pdf && !excluded {
            paths.push(path);
        }
    }

    paths.sort_by(|a, b| merge_order(a, b));

    Ok(paths
        .into_iter()
        .map(|path| {
            let title = chapter_title(&file_stem(&path));
            SourcePdf { path, title }
        })
        .collect())
}
