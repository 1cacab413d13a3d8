use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use thiserror::Error;

use super::metrics::{Font, TextMeasure};
use super::ChapterEntry;

/// Font face and size for one kind of text on a TOC page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
}

/// Geometry and presentation of the generated table of contents.
///
/// All coordinates are PDF user-space points with the origin at the bottom
/// left, so the cursor moves *down* by decreasing `y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocStyle {
    pub page_width: f32,
    pub page_height: f32,
    /// x of every label
    pub left_margin: f32,
    /// x at which page numbers end
    pub right_margin: f32,

    pub title: String,
    pub title_y: f32,
    pub title_font: TextStyle,

    /// Baseline of the first row on the first page, below the title
    pub first_row_y: f32,
    /// Baseline of the first row on continuation pages
    pub top_y: f32,
    /// A row is never started below this baseline
    pub bottom_y: f32,
    pub line_height: f32,
    pub entry_font: TextStyle,

    /// Space kept between the label, the leader and the page number
    pub gap: f32,
    /// Extra advance added after every leader dot
    pub dot_spacing: f32,

    /// Labels longer than this many characters are cut
    pub max_label_chars: usize,
    /// Characters kept from a cut label before the ellipsis
    pub truncate_keep: usize,
    pub ellipsis: String,
}

impl Default for TocStyle {
    fn default() -> Self {
        TocStyle {
            page_width: 612.0,
            page_height: 792.0,
            left_margin: 72.0,
            right_margin: 540.0,
            title: "Table of Contents".to_string(),
            title_y: 750.0,
            title_font: TextStyle {
                font: Font::HelveticaBold,
                size: 24.0,
            },
            first_row_y: 700.0,
            top_y: 750.0,
            bottom_y: 72.0,
            line_height: 20.0,
            entry_font: TextStyle {
                font: Font::Helvetica,
                size: 12.0,
            },
            gap: 5.0,
            dot_spacing: 2.0,
            max_label_chars: 60,
            truncate_keep: 57,
            ellipsis: "...".to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("page size must be positive, got {width}x{height}")]
    PageSize { width: f32, height: f32 },

    #[error("right margin {right} must lie right of left margin {left}")]
    Margins { left: f32, right: f32 },

    #[error("bottom cutoff {bottom} must lie below the top of the page {top}")]
    VerticalBounds { top: f32, bottom: f32 },

    #[error("first row {first_row} lies outside the page (height {height})")]
    FirstRow { first_row: f32, height: f32 },

    #[error("line height must be positive, got {0}")]
    LineHeight(f32),

    #[error("font size must be positive, got {0}")]
    FontSize(f32),

    #[error("dot spacing must be positive, got {0}")]
    DotSpacing(f32),

    #[error("truncated labels ({keep} + {ellipsis} chars) exceed the label limit of {max}")]
    Truncation {
        keep: usize,
        ellipsis: usize,
        max: usize,
    },
}

impl TocStyle {
    /// Reject geometry the pagination loop cannot work with.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if !(self.page_width > 0.0 && self.page_height > 0.0) {
            return Err(LayoutError::PageSize {
                width: self.page_width,
                height: self.page_height,
            });
        }
        if !(self.right_margin > self.left_margin) {
            return Err(LayoutError::Margins {
                left: self.left_margin,
                right: self.right_margin,
            });
        }
        if !(self.bottom_y < self.top_y) || self.top_y > self.page_height {
            return Err(LayoutError::VerticalBounds {
                top: self.top_y,
                bottom: self.bottom_y,
            });
        }
        if self.first_row_y > self.page_height {
            return Err(LayoutError::FirstRow {
                first_row: self.first_row_y,
                height: self.page_height,
            });
        }
        if !(self.line_height > 0.0) {
            return Err(LayoutError::LineHeight(self.line_height));
        }
        for size in [self.title_font.size, self.entry_font.size] {
            if !(size > 0.0) {
                return Err(LayoutError::FontSize(size));
            }
        }
        if !(self.dot_spacing > 0.0) {
            return Err(LayoutError::DotSpacing(self.dot_spacing));
        }
        let ellipsis = self.ellipsis.chars().count();
        if self.truncate_keep + ellipsis > self.max_label_chars {
            return Err(LayoutError::Truncation {
                keep: self.truncate_keep,
                ellipsis,
                max: self.max_label_chars,
            });
        }
        Ok(())
    }

    /// Shorten a label so it cannot run into the page-number column.
    pub fn truncate_label<'a>(&self, label: &'a str) -> Cow<'a, str> {
        if label.chars().count() > self.max_label_chars {
            let mut cut: String = label.chars().take(self.truncate_keep).collect();
            cut.push_str(&self.ellipsis);
            Cow::Owned(cut)
        } else {
            Cow::Borrowed(label)
        }
    }
}

/// One entry as drawn on a TOC page.
#[derive(Debug, Clone, PartialEq)]
pub struct TocRow {
    /// Index of the entry in the input sequence
    pub entry: usize,
    /// Baseline shared by label, leader and number
    pub y: f32,
    pub label: String,
    /// x of each leader dot
    pub dots: Vec<f32>,
    pub number: String,
    /// Left edge of the right-aligned page number
    pub number_x: f32,
    /// x before which the leader has to stop
    pub number_start: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TocPage {
    /// Only the first page carries the title
    pub title: Option<String>,
    pub rows: Vec<TocRow>,
}

/// Display list of a laid-out table of contents.
#[derive(Debug, Clone, PartialEq)]
pub struct TocLayout {
    pub pages: Vec<TocPage>,
}

impl TocLayout {
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Rows in reading order together with the index of their page
    #[cfg(test)]
    pub fn rows(&self) -> impl Iterator<Item = (usize, &TocRow)> {
        self.pages
            .iter()
            .enumerate()
            .flat_map(|(page, p)| p.rows.iter().map(move |row| (page, row)))
    }
}

/// Lay `entries` out into TOC pages.
///
/// The style must have passed [`TocStyle::validate`].
pub fn layout<M: TextMeasure + ?Sized>(
    entries: &[ChapterEntry],
    style: &TocStyle,
    measure: &M,
) -> TocLayout {
    let TextStyle { font, size } = style.entry_font;
    let dot_width = measure.string_width(".", font, size);

    let mut pages = Vec::new();
    let mut page = TocPage {
        title: Some(style.title.clone()),
        rows: Vec::new(),
    };
    let mut y = style.first_row_y;

    for (index, entry) in entries.iter().enumerate() {
        if y < style.bottom_y {
            pages.push(std::mem::take(&mut page));
            y = style.top_y;
        }

        let label = style.truncate_label(&entry.name);
        let number = entry.start_page.to_string();

        let number_width = measure.string_width(&number, font, size);
        let number_x = style.right_margin - number_width;
        let number_start = number_x - style.gap;
        let label_end = style.left_margin + measure.string_width(&label, font, size) + style.gap;

        let mut dots = Vec::new();
        let mut x = label_end;
        while x + dot_width <= number_start {
            dots.push(x);
            x += dot_width + style.dot_spacing;
        }

        page.rows.push(TocRow {
            entry: index,
            y,
            label: label.into_owned(),
            dots,
            number,
            number_x,
            number_start,
        });

        y -= style.line_height;
    }

    pages.push(page);
    TocLayout { pages }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::metrics::Base14Metrics;
    use pretty_assertions::assert_eq;

    fn entry(name: &str, start_page: u32) -> ChapterEntry {
        ChapterEntry {
            name: name.to_string(),
            start_page,
        }
    }

    /// Fits exactly 30 rows on every page.
    fn thirty_per_page() -> TocStyle {
        TocStyle {
            first_row_y: 600.0,
            top_y: 600.0,
            bottom_y: 20.0,
            line_height: 20.0,
            ..TocStyle::default()
        }
    }

    #[test]
    fn test_empty_entries_yield_title_page() {
        let toc = layout(&[], &TocStyle::default(), &Base14Metrics);
        assert_eq!(toc.page_count(), 1);
        assert_eq!(toc.pages[0].title.as_deref(), Some("Table of Contents"));
        assert!(toc.pages[0].rows.is_empty());
    }

    #[test]
    fn test_label_at_limit_is_kept() {
        let style = TocStyle::default();
        let label = "x".repeat(60);
        assert_eq!(style.truncate_label(&label), label);
    }

    #[test]
    fn test_long_label_is_cut() {
        let style = TocStyle::default();
        let label = "abcdefghij".repeat(7);
        let cut = style.truncate_label(&label);
        assert_eq!(cut.chars().count(), 60);
        assert_eq!(cut, format!("{}...", &label[..57]));
    }

    #[test]
    fn test_cut_counts_characters() {
        let style = TocStyle::default();
        let label = "é".repeat(61);
        let cut = style.truncate_label(&label);
        assert_eq!(cut, format!("{}...", "é".repeat(57)));
    }

    #[test]
    fn test_leader_stops_before_number() {
        let entries: Vec<_> = (1..=50)
            .map(|i: u32| entry(&format!("Chapter {}", "word ".repeat((i % 13) as usize)), i * 37))
            .collect();
        let style = TocStyle::default();
        let toc = layout(&entries, &style, &Base14Metrics);
        let dot_width = Base14Metrics.string_width(".", Font::Helvetica, 12.0);

        for (_, row) in toc.rows() {
            assert!(!row.dots.is_empty(), "row {} has no leader", row.entry);
            for &x in &row.dots {
                assert!(x + dot_width <= row.number_start);
            }
            assert!((row.number_start - (row.number_x - style.gap)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_leader_clears_wide_punctuation() {
        let style = TocStyle::default();
        let name = "—".repeat(20);
        let toc = layout(&[entry(&name, 3)], &style, &Base14Metrics);
        let row = &toc.pages[0].rows[0];
        // An em dash is a full em wide in Helvetica
        let label_end = style.left_margin + 20.0 * 12.0 + style.gap;
        assert!((row.dots[0] - label_end).abs() < 1e-3);
    }

    #[test]
    fn test_number_is_right_aligned() {
        let style = TocStyle::default();
        let toc = layout(&[entry("Intro", 1234)], &style, &Base14Metrics);
        let row = &toc.pages[0].rows[0];
        let width = Base14Metrics.string_width("1234", Font::Helvetica, 12.0);
        assert!((row.number_x + width - style.right_margin).abs() < 1e-4);
        assert_eq!(row.y, style.first_row_y);
    }

    #[test]
    fn test_dots_follow_label() {
        let style = TocStyle::default();
        let toc = layout(&[entry("Intro", 3)], &style, &Base14Metrics);
        let row = &toc.pages[0].rows[0];
        let label_end =
            style.left_margin + Base14Metrics.string_width("Intro", Font::Helvetica, 12.0) + style.gap;
        assert!((row.dots[0] - label_end).abs() < 1e-4);
        let step = Base14Metrics.string_width(".", Font::Helvetica, 12.0) + style.dot_spacing;
        for pair in row.dots.windows(2) {
            assert!((pair[1] - pair[0] - step).abs() < 1e-3);
        }
    }

    #[test]
    fn test_default_rows_per_page() {
        // 700 down to 80 on the first page, 750 down to 80 afterwards
        let style = TocStyle::default();
        let entries: Vec<_> = (1..=100).map(|i| entry("Part", i)).collect();
        let toc = layout(&entries, &style, &Base14Metrics);
        let counts: Vec<_> = toc.pages.iter().map(|p| p.rows.len()).collect();
        assert_eq!(counts, vec![32, 34, 34]);
        assert_eq!(toc.pages[1].title, None);
        assert_eq!(toc.pages[1].rows[0].y, style.top_y);
    }

    #[test]
    fn test_pages_in_input_order() {
        let entries: Vec<_> = (1..=200).map(|i| entry(&format!("Entry {i}"), i)).collect();
        let toc = layout(&entries, &thirty_per_page(), &Base14Metrics);
        assert_eq!(toc.page_count(), 7);

        let mut previous_page = 0;
        for (expected, (page, row)) in toc.rows().enumerate() {
            assert_eq!(row.entry, expected);
            assert!(page >= previous_page);
            previous_page = page;
        }
    }

    #[test]
    fn test_overlong_label_still_draws_number() {
        let style = TocStyle {
            right_margin: 100.0,
            ..TocStyle::default()
        };
        let toc = layout(&[entry(&"W".repeat(60), 9)], &style, &Base14Metrics);
        let row = &toc.pages[0].rows[0];
        assert!(row.dots.is_empty());
        assert_eq!(row.number, "9");
        assert!((row.number_x - (100.0 - Base14Metrics.string_width("9", Font::Helvetica, 12.0))).abs() < 1e-4);
    }

    #[test]
    fn test_validate_default() {
        assert_eq!(TocStyle::default().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let style = TocStyle {
            bottom_y: 760.0,
            ..TocStyle::default()
        };
        assert!(matches!(
            style.validate(),
            Err(LayoutError::VerticalBounds { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_line_height() {
        let style = TocStyle {
            line_height: 0.0,
            ..TocStyle::default()
        };
        assert_eq!(style.validate(), Err(LayoutError::LineHeight(0.0)));
    }

    #[test]
    fn test_validate_rejects_long_ellipsis() {
        let style = TocStyle {
            truncate_keep: 59,
            ..TocStyle::default()
        };
        assert!(matches!(style.validate(), Err(LayoutError::Truncation { .. })));
    }
}
