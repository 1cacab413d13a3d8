use anyhow::{Context, Result};
use lopdf::{dictionary, Document, Object, ObjectId};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, trace};

use super::document::PdfDocument;
use super::outline::write_outline;
use super::render::render_toc;
use crate::toc::{Pagination, TocStyle};

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    Merged { pages: u32 },
    Skipped { reason: String },
    Failed { reason: String },
}

/// Load a source PDF for merging.
///
/// Encrypted files that do not open with the empty password, and files
/// without pages, are skipped; anything that cannot be parsed fails.
pub fn load_source(path: &Path) -> std::result::Result<Document, SourceOutcome> {
    let mut pdf = PdfDocument::open(path).map_err(|e| SourceOutcome::Failed {
        reason: format!("{:#}", e),
    })?;

    if pdf.is_encrypted() {
        pdf.unlock().map_err(|_| SourceOutcome::Skipped {
            reason: "encrypted".to_string(),
        })?;
    }

    if pdf.page_count() == 0 {
        return Err(SourceOutcome::Skipped {
            reason: "no pages".to_string(),
        });
    }

    Ok(pdf.into_inner())
}

// Attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Builds the combined document: body pages appended one source at a time,
/// then the table of contents prepended and the outline attached.
pub struct Binder {
    doc: Document,
    pages_id: ObjectId,
    body: Vec<ObjectId>,
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}

impl Binder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Binder {
            doc,
            pages_id,
            body: Vec::new(),
        }
    }

    pub fn body_pages(&self) -> u32 {
        self.body.len() as u32
    }

    /// Move every page of `source` to the end of the body.
    ///
    /// Returns the number of pages added.
    pub fn append(&mut self, mut source: Document) -> u32 {
        copy_inherited_attributes(&mut source);

        source.renumber_objects_with(self.doc.max_id + 1);
        let pages: Vec<ObjectId> = source.get_pages().into_values().collect();

        for (id, object) in std::mem::take(&mut source.objects) {
            match object.type_name().unwrap_or(b"") {
                b"Catalog" | b"Pages" | b"Outlines" | b"Outline" => {
                    trace!(?id, "dropping source structure object");
                }
                _ => {
                    self.doc.objects.insert(id, object);
                }
            }
        }
        self.doc.max_id = self.doc.max_id.max(source.max_id);

        for &page_id in &pages {
            if let Ok(page) = self.doc.get_dictionary_mut(page_id) {
                page.set("Parent", self.pages_id);
            }
        }

        let added = pages.len() as u32;
        self.body.extend(pages);
        debug!(added, total = self.body.len(), "appended source pages");
        added
    }

    /// Prepend the table of contents, register one bookmark per entry and
    /// return the finished document.
    pub fn finish(mut self, pagination: &Pagination, style: &TocStyle) -> Result<Document> {
        let toc = render_toc(&mut self.doc, self.pages_id, &pagination.layout, style)?;

        let kids: Vec<ObjectId> = toc.into_iter().chain(self.body).collect();

        let mut targets = Vec::with_capacity(pagination.entries.len());
        for (name, index) in pagination.bookmark_targets() {
            let page_id = kids.get(index).with_context(|| {
                format!(
                    "Bookmark '{}' points at page {} of {}",
                    name,
                    index + 1,
                    kids.len()
                )
            })?;
            targets.push((name, *page_id));
        }

        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids.iter().map(|&id| Object::Reference(id)).collect::<Vec<_>>(),
                "Count" => kids.len() as i64,
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        };
        if let Some(outline_id) = write_outline(&mut self.doc, &targets) {
            catalog.set("Outlines", outline_id);
            catalog.set("PageMode", "UseOutlines");
        }
        let catalog_id = self.doc.add_object(catalog);
        self.doc.trailer.set("Root", catalog_id);

        // Objects only reachable from the sources' dropped catalogs
        let pruned = self.doc.prune_objects();
        debug!(pruned = pruned.len(), "pruned unreachable objects");

        Ok(self.doc)
    }
}

/// Copy inherited page attributes down onto each page so pages keep their
/// resources and size once re-parented.
fn copy_inherited_attributes(doc: &mut Document) {
    for page_id in doc.get_pages().into_values() {
        let inherited = inherited_attributes(doc, page_id);
        if let Ok(page) = doc.get_dictionary_mut(page_id) {
            for (key, value) in inherited {
                if !page.has(key) {
                    page.set(key, value);
                }
            }
        }
    }
}

fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(&'static [u8], Object)> {
    let mut found: Vec<(&'static [u8], Object)> = Vec::new();
    let mut visited = vec![page_id];
    let mut parent = doc
        .get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"Parent").ok())
        .and_then(|p| p.as_reference().ok());

    while let Some(node_id) = parent {
        if visited.contains(&node_id) {
            break;
        }
        visited.push(node_id);

        let Ok(node) = doc.get_dictionary(node_id) else {
            break;
        };
        for key in INHERITABLE {
            if found.iter().any(|(k, _)| *k == key) {
                continue;
            }
            if let Ok(value) = node.get(key) {
                found.push((key, value.clone()));
            }
        }
        parent = node.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::outline::read_outline_from_doc;
    use crate::toc::{paginate, provisional_entries, Base14Metrics};
    use lopdf::content::Content;
    use pretty_assertions::assert_eq;

    /// A source document whose pages inherit their size and resources from
    /// the page tree root and draw their own label.
    fn source_document(label: &str, pages: usize) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let page_ids: Vec<Object> = (0..pages)
            .map(|i| {
                let text = format!("{label} page {}", i + 1);
                let content = Content {
                    operations: vec![
                        lopdf::content::Operation::new("BT", vec![]),
                        lopdf::content::Operation::new("Tf", vec!["F1".into(), 12.into()]),
                        lopdf::content::Operation::new("Td", vec![72.into(), 700.into()]),
                        lopdf::content::Operation::new("Tj", vec![Object::string_literal(text)]),
                        lopdf::content::Operation::new("ET", vec![]),
                    ],
                };
                let content_id = doc.add_object(lopdf::Stream::new(
                    dictionary! {},
                    content.encode().unwrap(),
                ));
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                })
                .into()
            })
            .collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => page_ids,
                "Count" => pages as i64,
                "MediaBox" => vec![0.into(), 0.into(), 300.into(), 400.into()],
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    fn page_text(doc: &Document, page_id: ObjectId) -> Vec<u8> {
        let content = doc.get_page_content(page_id).unwrap();
        Content::decode(&content)
            .unwrap()
            .operations
            .into_iter()
            .find(|op| op.operator == "Tj")
            .and_then(|op| op.operands.into_iter().next())
            .and_then(|o| o.as_str().ok().map(|s| s.to_vec()))
            .unwrap_or_default()
    }

    fn save_encrypted(mut doc: Document, path: &Path, owner: &str, user: &str) {
        let id = Object::string_literal("0123456789abcdef");
        doc.trailer.set("ID", Object::Array(vec![id.clone(), id]));
        let version = lopdf::EncryptionVersion::V2 {
            document: &doc,
            owner_password: owner,
            user_password: user,
            key_length: 128,
            permissions: lopdf::Permissions::all(),
        };
        let state = lopdf::EncryptionState::try_from(version).unwrap();
        doc.encrypt(&state).unwrap();
        doc.save(path).unwrap();
    }

    #[test]
    fn test_append_keeps_page_order() {
        let mut binder = Binder::new();
        assert_eq!(binder.append(source_document("a", 3)), 3);
        assert_eq!(binder.append(source_document("b", 2)), 2);
        assert_eq!(binder.body_pages(), 5);

        let entries = provisional_entries([("A", 3), ("B", 2)]);
        let style = TocStyle::default();
        let pagination = paginate(entries, &style, &Base14Metrics).unwrap();
        let doc = binder.finish(&pagination, &style).unwrap();

        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        assert_eq!(pages.len(), 6);
        let texts: Vec<Vec<u8>> = pages.iter().map(|&id| page_text(&doc, id)).collect();
        assert_eq!(texts[0], b"Table of Contents");
        assert_eq!(texts[1], b"a page 1");
        assert_eq!(texts[3], b"a page 3");
        assert_eq!(texts[4], b"b page 1");
        assert_eq!(texts[5], b"b page 2");
    }

    #[test]
    fn test_inherited_attributes_survive() {
        let mut binder = Binder::new();
        binder.append(source_document("a", 2));
        let style = TocStyle::default();
        let pagination =
            paginate(provisional_entries([("A", 2)]), &style, &Base14Metrics).unwrap();
        let doc = binder.finish(&pagination, &style).unwrap();

        let body_page = doc.get_pages()[&2];
        let page = doc.get_dictionary(body_page).unwrap();
        assert!(page.has(b"Resources"));
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        assert_eq!(media_box[2].as_i64().unwrap(), 300);
    }

    #[test]
    fn test_bookmarks_point_past_toc() {
        let mut binder = Binder::new();
        binder.append(source_document("a", 11));
        binder.append(source_document("b", 4));

        let style = TocStyle::default();
        let pagination = paginate(
            provisional_entries([("Chapter One", 11), ("Chapter Two", 4)]),
            &style,
            &Base14Metrics,
        )
        .unwrap();
        let doc = binder.finish(&pagination, &style).unwrap();

        let bookmarks = read_outline_from_doc(&doc).unwrap();
        let pages: Vec<_> = bookmarks.iter().map(|b| (b.title.as_str(), b.page)).collect();
        assert_eq!(pages, vec![("Chapter One", Some(2)), ("Chapter Two", Some(13))]);
    }

    #[test]
    fn test_empty_source_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        let mut doc = source_document("x", 0);
        doc.save(&path).unwrap();

        assert_eq!(
            load_source(&path).unwrap_err(),
            SourceOutcome::Skipped {
                reason: "no pages".to_string()
            }
        );
    }

    #[test]
    fn test_garbage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();

        assert!(matches!(
            load_source(&path),
            Err(SourceOutcome::Failed { .. })
        ));
    }

    #[test]
    fn test_empty_password_source_merges_plaintext() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("open.pdf");
        save_encrypted(source_document("secret", 1), &path, "", "");

        let source = load_source(&path).unwrap();
        assert!(!source.is_encrypted());

        let mut binder = Binder::new();
        assert_eq!(binder.append(source), 1);
        let style = TocStyle::default();
        let pagination =
            paginate(provisional_entries([("Open", 1)]), &style, &Base14Metrics).unwrap();
        let mut doc = binder.finish(&pagination, &style).unwrap();

        let body_page = doc.get_pages()[&2];
        assert_eq!(page_text(&doc, body_page), b"secret page 1");

        let saved = dir.path().join("combined.pdf");
        doc.save(&saved).unwrap();
        let reloaded = Document::load(&saved).unwrap();
        assert!(!reloaded.is_encrypted());
        assert_eq!(page_text(&reloaded, reloaded.get_pages()[&2]), b"secret page 1");
    }

    #[test]
    fn test_password_protected_source_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.pdf");
        save_encrypted(source_document("secret", 1), &path, "owner", "hunter2");

        assert_eq!(
            load_source(&path).unwrap_err(),
            SourceOutcome::Skipped {
                reason: "encrypted".to_string()
            }
        );
    }
}
