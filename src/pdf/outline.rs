use anyhow::{Context, Result};
use lopdf::{dictionary, Document, Object, ObjectId, StringFormat};
use std::collections::HashMap;
use std::path::Path;

use super::document::{decode_pdf_string, encode_pdf_string};

/// A bookmark read back from a document outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Bookmark {
    pub title: String,
    /// 1-based page the bookmark opens
    pub page: Option<u32>,
    pub level: u32,
}

/// Write a flat outline with one item per `(title, page)` and return the
/// id of the `/Outlines` dictionary, or `None` if there is nothing to add.
pub fn write_outline(doc: &mut Document, items: &[(&str, ObjectId)]) -> Option<ObjectId> {
    if items.is_empty() {
        return None;
    }

    let root_id = doc.new_object_id();
    let item_ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();

    for (i, ((title, page_id), &id)) in items.iter().zip(&item_ids).enumerate() {
        let mut item = dictionary! {
            "Title" => Object::String(encode_pdf_string(title), StringFormat::Literal),
            "Parent" => root_id,
            "Dest" => vec![Object::Reference(*page_id), "Fit".into()],
        };
        if i > 0 {
            item.set("Prev", item_ids[i - 1]);
        }
        if let Some(&next) = item_ids.get(i + 1) {
            item.set("Next", next);
        }
        doc.objects.insert(id, Object::Dictionary(item));
    }

    let root = dictionary! {
        "Type" => "Outlines",
        "First" => item_ids[0],
        "Last" => item_ids[item_ids.len() - 1],
        "Count" => item_ids.len() as i64,
    };
    doc.objects.insert(root_id, Object::Dictionary(root));
    Some(root_id)
}

/// Read the outline of a PDF as a flat, depth-first list.
pub fn read_outline<P: AsRef<Path>>(path: P) -> Result<Vec<Bookmark>> {
    let path = path.as_ref();
    let doc =
        Document::load(path).with_context(|| format!("Failed to open PDF: {}", path.display()))?;

    read_outline_from_doc(&doc)
}

pub fn read_outline_from_doc(doc: &Document) -> Result<Vec<Bookmark>> {
    let catalog = doc
        .catalog()
        .with_context(|| "Failed to get document catalog")?;

    let outlines = match catalog.get(b"Outlines") {
        Ok(Object::Reference(r)) => match doc.get_dictionary(*r) {
            Ok(d) => d,
            Err(_) => return Ok(Vec::new()),
        },
        _ => return Ok(Vec::new()),
    };

    let first = match outlines.get(b"First") {
        Ok(Object::Reference(r)) => *r,
        _ => return Ok(Vec::new()),
    };

    let page_numbers: HashMap<ObjectId, u32> = doc
        .get_pages()
        .into_iter()
        .map(|(num, id)| (id, num))
        .collect();

    let mut bookmarks = Vec::new();
    let mut visited = Vec::new();
    collect_items(doc, first, &page_numbers, 0, &mut visited, &mut bookmarks);
    Ok(bookmarks)
}

fn collect_items(
    doc: &Document,
    first: ObjectId,
    page_numbers: &HashMap<ObjectId, u32>,
    level: u32,
    visited: &mut Vec<ObjectId>,
    out: &mut Vec<Bookmark>,
) {
    let mut current = Some(first);

    while let Some(id) = current {
        // Malformed outlines can link back to an earlier item
        if visited.contains(&id) {
            break;
        }
        visited.push(id);

        let Ok(dict) = doc.get_dictionary(id) else {
            break;
        };

        let title = match dict.get(b"Title") {
            Ok(Object::String(bytes, _)) => decode_pdf_string(bytes),
            _ => "Untitled".to_string(),
        };
        out.push(Bookmark {
            title,
            page: destination_page(doc, dict, page_numbers),
            level,
        });

        if let Ok(Object::Reference(child)) = dict.get(b"First") {
            collect_items(doc, *child, page_numbers, level + 1, visited, out);
        }

        current = match dict.get(b"Next") {
            Ok(Object::Reference(r)) => Some(*r),
            _ => None,
        };
    }
}

fn destination_page(
    doc: &Document,
    item: &lopdf::Dictionary,
    page_numbers: &HashMap<ObjectId, u32>,
) -> Option<u32> {
    if let Ok(dest) = item.get(b"Dest") {
        return resolve_destination(doc, dest, page_numbers, 0);
    }

    let action = match item.get(b"A") {
        Ok(Object::Reference(r)) => doc.get_dictionary(*r).ok()?,
        Ok(Object::Dictionary(d)) => d,
        _ => return None,
    };
    match action.get(b"S") {
        Ok(Object::Name(kind)) if kind == b"GoTo" => {
            resolve_destination(doc, action.get(b"D").ok()?, page_numbers, 0)
        }
        _ => None,
    }
}

fn resolve_destination(
    doc: &Document,
    dest: &Object,
    page_numbers: &HashMap<ObjectId, u32>,
    depth: u32,
) -> Option<u32> {
    if depth > 8 {
        return None;
    }
    match dest {
        Object::Array(arr) => match arr.first() {
            Some(Object::Reference(page)) => page_numbers.get(page).copied(),
            _ => None,
        },
        Object::Reference(r) => {
            resolve_destination(doc, doc.get_object(*r).ok()?, page_numbers, depth + 1)
        }
        // Named destinations from the old-style /Dests dictionary
        Object::Name(name) | Object::String(name, _) => {
            let dests = match doc.catalog().ok()?.get(b"Dests").ok()? {
                Object::Reference(r) => doc.get_dictionary(*r).ok()?,
                Object::Dictionary(d) => d,
                _ => return None,
            };
            let target = dests.get(name).ok()?;
            let target = match target {
                // Either the array itself or a dictionary holding it under /D
                Object::Dictionary(d) => d.get(b"D").ok()?,
                other => other,
            };
            resolve_destination(doc, target, page_numbers, depth + 1)
        }
        _ => None,
    }
}
