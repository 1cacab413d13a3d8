use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct PageText {
    pub page: u32,
    pub text: String,
}

/// Text of a whole document, page by page.
#[derive(Debug, Clone)]
pub struct DocumentText {
    /// Pages in the document, including those without text
    pub page_count: u32,
    /// Pages that produced any text
    pub pages: Vec<PageText>,
}

impl DocumentText {
    /// Text of every non-empty page joined by newlines
    pub fn joined(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Extract the text of every page of a PDF
pub fn extract_document_text<P: AsRef<Path>>(path: P) -> Result<DocumentText> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read PDF: {}", path.display()))?;

    let doc = lopdf::Document::load_mem(&bytes)
        .with_context(|| format!("Failed to parse PDF: {}", path.display()))?;
    let page_count = doc.get_pages().len() as u32;

    let page_texts = pdf_extract::extract_text_from_mem_by_pages(&bytes)
        .with_context(|| format!("Failed to extract text from PDF: {}", path.display()))?;

    let pages = non_empty_pages(page_texts);
    for page in &pages {
        trace!(page = page.page, chars = page.text.len(), "page text");
    }
    debug!(page_count, text_pages = pages.len(), "extracted text");

    Ok(DocumentText { page_count, pages })
}

/// Number the pages from 1 and drop those without any text
fn non_empty_pages(texts: Vec<String>) -> Vec<PageText> {
    texts
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(index, text)| PageText {
            page: (index + 1) as u32,
            text,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};
    use pretty_assertions::assert_eq;

    fn write_pdf(path: &Path, texts: &[&str]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let kids: Vec<Object> = texts
            .iter()
            .map(|text| {
                let mut operations = Vec::new();
                if !text.is_empty() {
                    operations = vec![
                        Operation::new("BT", vec![]),
                        Operation::new("Tf", vec!["F1".into(), 12.into()]),
                        Operation::new("Td", vec![72.into(), 700.into()]),
                        Operation::new("Tj", vec![Object::string_literal(*text)]),
                        Operation::new("ET", vec![]),
                    ];
                }
                let content = Content { operations };
                let content_id =
                    doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                    "Contents" => content_id,
                    "Resources" => resources_id,
                })
                .into()
            })
            .collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => texts.len() as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_pages_extracted_separately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("three.pdf");
        write_pdf(&path, &["alpha page", "beta page", "gamma page"]);

        let text = extract_document_text(&path).unwrap();
        assert_eq!(text.page_count, 3);
        let numbers: Vec<_> = text.pages.iter().map(|p| p.page).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(text.pages[1].text.contains("beta page"));

        let joined = text.joined();
        assert!(!joined.contains("pagebeta"));
        assert!(!joined.contains("pagegamma"));
        let words: Vec<_> = joined.split_whitespace().collect();
        assert_eq!(words, vec!["alpha", "page", "beta", "page", "gamma", "page"]);
    }

    #[test]
    fn test_blank_pages_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gap.pdf");
        write_pdf(&path, &["first", "", "third"]);

        let text = extract_document_text(&path).unwrap();
        assert_eq!(text.page_count, 3);
        let numbers: Vec<_> = text.pages.iter().map(|p| p.page).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn test_joined() {
        let text = DocumentText {
            page_count: 3,
            pages: non_empty_pages(vec!["alpha".into(), "  \n".into(), "beta".into()]),
        };
        assert_eq!(text.joined(), "alpha\nbeta");
    }
}
