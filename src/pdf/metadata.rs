//! PDF metadata extraction

use std::path::Path;
use lopdf::{Dictionary, Document, Object, ObjectId};
use crate::error::{Error, Result};
use crate::pdf::recolor::page_media_box;

/// Size and annotation count of one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageSummary {
    /// 1-based page number
    pub number: u32,
    /// MediaBox width in points
    pub width: f32,
    /// MediaBox height in points
    pub height: f32,
    /// Number of entries in the page's Annots array
    pub annotations: usize,
}

/// PDF metadata
#[derive(Debug, Clone)]
pub struct DocumentSummary {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// Per-page details, in page order
    pub pages: Vec<PageSummary>,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
    /// Producing application (if present)
    pub producer: Option<String>,
}

/// Summarize PDF bytes
pub fn inspect(bytes: &[u8]) -> Result<DocumentSummary> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| Error::DocumentParse(e.to_string()))?;
    summarize(&doc)
}

/// Summarize a PDF file
pub fn inspect_file(path: &Path) -> Result<DocumentSummary> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path)?;
    inspect(&bytes)
}

/// Summarize an already loaded document
pub fn summarize(doc: &Document) -> Result<DocumentSummary> {
    let page_ids = doc.get_pages();

    if page_ids.is_empty() {
        return Err(Error::DocumentParse("document has no pages".to_string()));
    }

    let mut pages = Vec::with_capacity(page_ids.len());
    for (&number, &page_id) in &page_ids {
        let area = page_media_box(doc, number, page_id)?;
        pages.push(PageSummary {
            number,
            width: area.width,
            height: area.height,
            annotations: page_annotations(doc, page_id).len(),
        });
    }

    // Try to extract title, author and producer from the Info dictionary
    let info = info_dictionary(doc);

    Ok(DocumentSummary {
        page_count: pages.len(),
        pages,
        title: info.and_then(|d| info_string(d, b"Title")),
        author: info.and_then(|d| info_string(d, b"Author")),
        producer: info.and_then(|d| info_string(d, b"Producer")),
    })
}

/// The entries of a page's Annots array, resolving an indirect array
pub fn page_annotations(doc: &Document, page_id: ObjectId) -> Vec<Object> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };

    match page.get(b"Annots") {
        Ok(Object::Array(annots)) => annots.clone(),
        Ok(Object::Reference(id)) => doc
            .get_object(*id)
            .and_then(Object::as_array)
            .map(|annots| annots.clone())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// The trailer's Info dictionary, whether stored inline or by reference
fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info") {
        Ok(Object::Dictionary(info)) => Some(info),
        Ok(Object::Reference(id)) => doc.get_dictionary(*id).ok(),
        _ => None,
    }
}

fn info_string(info: &Dictionary, key: &[u8]) -> Option<String> {
    let bytes = info.get(key).and_then(Object::as_str).ok()?;
    String::from_utf8(bytes.to_vec()).ok()
}
