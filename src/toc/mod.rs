//! Table-of-contents layout and the two-pass pagination that fixes up
//! page numbers once the TOC's own length is known.

pub mod layout;
pub mod metrics;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use layout::{layout, LayoutError, TocLayout, TocStyle};
pub use metrics::{Base14Metrics, Font, TextMeasure};

/// One source document as listed in the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterEntry {
    pub name: String,
    /// 1-based page in the final document
    pub start_page: u32,
}

impl ChapterEntry {
    fn offset_by(self, pages: u32) -> Self {
        ChapterEntry {
            start_page: self.start_page + pages,
            ..self
        }
    }
}

/// Build entries from `(name, page count)` pairs in merge order, as if the
/// body started on page 1.
pub fn provisional_entries<I, S>(chapters: I) -> Vec<ChapterEntry>
where
    I: IntoIterator<Item = (S, u32)>,
    S: Into<String>,
{
    chapters
        .into_iter()
        .scan(0u32, |pages_before, (name, pages)| {
            let start_page = *pages_before + 1;
            *pages_before += pages;
            Some(ChapterEntry {
                name: name.into(),
                start_page,
            })
        })
        .collect()
}

/// Final TOC together with the entries it lists.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub entries: Vec<ChapterEntry>,
    pub layout: TocLayout,
}

impl Pagination {
    pub fn toc_pages(&self) -> u32 {
        self.layout.page_count()
    }

    /// Zero-based page index each entry's bookmark points at
    pub fn bookmark_targets(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries
            .iter()
            .map(|e| (e.name.as_str(), (e.start_page - 1) as usize))
    }
}

/// Lay out the TOC twice: once to learn how many pages it takes, and again
/// with every start page shifted by that count.
pub fn paginate<M: TextMeasure + ?Sized>(
    entries: Vec<ChapterEntry>,
    style: &TocStyle,
    measure: &M,
) -> Result<Pagination, LayoutError> {
    style.validate()?;

    let toc_pages = layout(&entries, style, measure).page_count();
    debug!(entries = entries.len(), toc_pages, "measured table of contents");

    let entries: Vec<_> = entries
        .into_iter()
        .map(|entry| entry.offset_by(toc_pages))
        .collect();
    let layout = layout(&entries, style, measure);
    debug_assert_eq!(layout.page_count(), toc_pages);

    Ok(Pagination { entries, layout })
}
