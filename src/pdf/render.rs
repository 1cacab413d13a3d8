use anyhow::{Context, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::document::encode_win_ansi;
use crate::toc::layout::{TextStyle, TocLayout, TocPage, TocStyle};
use crate::toc::Font;

/// Add one page object per TOC page to `doc`, all parented to `pages_id`.
///
/// The returned ids are in reading order; the caller links them into the
/// page tree.
pub fn render_toc(
    doc: &mut Document,
    pages_id: ObjectId,
    toc: &TocLayout,
    style: &TocStyle,
) -> Result<Vec<ObjectId>> {
    let resources = font_resources(doc);
    let resources_id = doc.add_object(resources);

    let mut page_ids = Vec::with_capacity(toc.pages.len());
    for (index, page) in toc.pages.iter().enumerate() {
        let content = page_content(page, style);
        let bytes = content
            .encode()
            .with_context(|| format!("Failed to encode table of contents page {}", index + 1))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, bytes));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), style.page_width.into(), style.page_height.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        page_ids.push(page_id);
    }

    Ok(page_ids)
}

fn font_resources(doc: &mut Document) -> Dictionary {
    let mut fonts = Dictionary::new();
    for font in Font::ALL {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_name(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource_name(), font_id);
    }
    dictionary! { "Font" => fonts }
}

fn page_content(page: &TocPage, style: &TocStyle) -> Content {
    let mut ops = Vec::new();

    if let Some(title) = &page.title {
        show_text(&mut ops, style.title_font, style.left_margin, style.title_y, title);
    }

    for row in &page.rows {
        show_text(&mut ops, style.entry_font, style.left_margin, row.y, &row.label);
        for &x in &row.dots {
            show_text(&mut ops, style.entry_font, x, row.y, ".");
        }
        show_text(&mut ops, style.entry_font, row.number_x, row.y, &row.number);
    }

    Content { operations: ops }
}

fn show_text(ops: &mut Vec<Operation>, text_style: TextStyle, x: f32, y: f32, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![
            Object::Name(text_style.font.resource_name().as_bytes().to_vec()),
            text_style.size.into(),
        ],
    ));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}
