//! Background recoloring of PDF pages using lopdf
//!
//! Every page gets a solid rectangle painted over its whole MediaBox before
//! any of its own content runs. The page's own drawing lands on top, so the
//! color only shows where the page leaves the background bare.

use std::io::Write;
use std::path::Path;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, info};
use crate::color::Rgb;
use crate::error::{Error, Result};

/// Written into the Info dictionary of every output document
const PRODUCER: &str = concat!("pdf-readability ", env!("CARGO_PKG_VERSION"));

/// Upper bound on `/Parent` hops when looking up inherited page attributes
const MAX_TREE_DEPTH: usize = 32;

/// A page rectangle in default user space (points)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    /// Lower-left x
    pub left: f32,
    /// Lower-left y
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
}

impl PageBox {
    /// Build a box from a `[llx lly urx ury]` array.
    ///
    /// The corners may come in either order; width and height must be positive.
    pub fn from_array(values: &[Object]) -> std::result::Result<Self, String> {
        if values.len() != 4 {
            return Err(format!("MediaBox has {} entries, expected 4", values.len()));
        }

        let mut coords = [0f32; 4];
        for (slot, value) in coords.iter_mut().zip(values) {
            *slot = match value {
                Object::Integer(i) => *i as f32,
                Object::Real(r) => *r,
                other => return Err(format!("MediaBox entry is not a number: {:?}", other)),
            };
        }

        let [x0, y0, x1, y1] = coords;
        let width = (x1 - x0).abs();
        let height = (y1 - y0).abs();

        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(format!("MediaBox is {} x {}, both sides must be positive", width, height));
        }

        Ok(Self {
            left: x0.min(x1),
            bottom: y0.min(y1),
            width,
            height,
        })
    }
}

/// Recolor the background of every page in a PDF
///
/// `input` is parsed into a private working copy; the returned bytes are a
/// complete new document with the same page count, page sizes and
/// annotations as the input.
///
/// # Example
///
/// ```no_run
/// use pdf_readability::{recolor, Rgb};
///
/// let input = std::fs::read("paper.pdf").unwrap();
/// let output = recolor(&input, Rgb::from_hex("F7F1E4").unwrap()).unwrap();
/// std::fs::write("readbetter_paper.pdf", output).unwrap();
/// ```
pub fn recolor(input: &[u8], color: Rgb) -> Result<Vec<u8>> {
    render(input, color).map(|(bytes, _)| bytes)
}

/// Same as [`recolor`], with the color given as six hex digits
pub fn recolor_hex(input: &[u8], color_hex: &str) -> Result<Vec<u8>> {
    let color = Rgb::from_hex(color_hex)?;
    recolor(input, color)
}

/// Recolor a PDF file and write the result to `output_path`
///
/// Returns the number of pages written. Nothing is written if any page fails.
pub fn recolor_file(input_path: &Path, output_path: &Path, color: Rgb) -> Result<usize> {
    if !input_path.exists() {
        return Err(Error::FileNotFound(input_path.to_path_buf()));
    }

    let input = std::fs::read(input_path)?;
    let (bytes, page_count) = render(&input, color)?;
    write_pdf(output_path, &bytes)?;

    Ok(page_count)
}

/// Parse, recolor and serialize; also reports the page count
pub(crate) fn render(input: &[u8], color: Rgb) -> Result<(Vec<u8>, usize)> {
    let mut doc = Document::load_mem(input)
        .map_err(|e| Error::DocumentParse(e.to_string()))?;

    let page_count = recolor_document(&mut doc, color)?;
    stamp_producer(&mut doc);

    doc.compress();
    let mut output = Vec::new();
    doc.save_to(&mut output)?;

    info!(pages = page_count, color = %color, bytes = output.len(), "recolored document");
    Ok((output, page_count))
}

/// Paint the background behind every page of an already loaded document
///
/// Returns the number of pages processed. Stops at the first page whose
/// MediaBox cannot be used; the document should then be discarded.
pub fn recolor_document(doc: &mut Document, color: Rgb) -> Result<usize> {
    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(Error::DocumentParse("document has no pages".to_string()));
    }

    for (&page_number, &page_id) in &pages {
        composite_page(doc, page_number, page_id, color)?;
    }

    Ok(pages.len())
}

/// Resolve the MediaBox that applies to a page, following inheritance
pub fn page_media_box(doc: &Document, page_number: u32, page_id: ObjectId) -> Result<PageBox> {
    let composition_error = |reason: String| Error::PageComposition {
        page: page_number,
        reason,
    };

    let object = inherited_attribute(doc, page_id, b"MediaBox")
        .ok_or_else(|| composition_error("page has no MediaBox".to_string()))?;

    let values = match object {
        Object::Array(values) => values,
        Object::Reference(id) => doc
            .get_object(*id)
            .and_then(Object::as_array)
            .map_err(|e| composition_error(format!("MediaBox reference is unusable: {}", e)))?,
        other => return Err(composition_error(format!("MediaBox is not an array: {:?}", other))),
    };

    PageBox::from_array(values).map_err(composition_error)
}

/// Look up a page attribute on the page itself or the nearest ancestor
/// Pages node that defines it
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent_id).ok()?;
    }

    None
}

/// Put a background stream underneath one page's content
fn composite_page(doc: &mut Document, page_number: u32, page_id: ObjectId, color: Rgb) -> Result<()> {
    let area = page_media_box(doc, page_number, page_id)?;

    let background = Stream::new(Dictionary::new(), background_content(&area, color)?);
    let background_id = doc.add_object(background);
    prepend_content_to_page(doc, page_id, background_id)?;

    debug!(
        page = page_number,
        width = area.width,
        height = area.height,
        "painted page background"
    );
    Ok(())
}

/// Content stream filling `area` with `color`
///
/// Wrapped in q/Q so the fill color does not carry over into the page's own
/// content, which may rely on the default black.
fn background_content(area: &PageBox, color: Rgb) -> Result<Vec<u8>> {
    let [red, green, blue] = color.components();

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new("rg", vec![red.into(), green.into(), blue.into()]),
            Operation::new(
                "re",
                vec![
                    area.left.into(),
                    area.bottom.into(),
                    area.width.into(),
                    area.height.into(),
                ],
            ),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ],
    };

    Ok(content.encode()?)
}

/// Prepend a content stream to a page's Contents
///
/// Prepending means it is drawn first, beneath everything already on the page.
fn prepend_content_to_page(doc: &mut Document, page_id: ObjectId, new_content_id: ObjectId) -> Result<()> {
    let existing: Vec<Object> = match doc.get_dictionary(page_id)?.get(b"Contents") {
        // An indirect array of streams is flattened so Contents stays a plain array
        Ok(Object::Reference(content_id)) => match doc.get_object(*content_id) {
            Ok(Object::Array(streams)) => streams.clone(),
            _ => vec![Object::Reference(*content_id)],
        },
        Ok(Object::Array(streams)) => streams.clone(),
        Ok(other) => vec![other.clone()],
        Err(_) => vec![],
    };

    let mut contents = Vec::with_capacity(existing.len() + 1);
    contents.push(Object::Reference(new_content_id));
    contents.extend(existing);

    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));

    Ok(())
}

/// Record who produced the file and when
fn stamp_producer(doc: &mut Document) {
    let now = chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string();

    // Info may sit directly in the trailer or behind a reference
    if let Ok(Object::Dictionary(info)) = doc.trailer.get_mut(b"Info") {
        set_producer(info, &now);
        return;
    }

    let info_id = doc.trailer.get(b"Info").and_then(Object::as_reference).ok();
    if let Some(info) = info_id.and_then(|id| doc.get_dictionary_mut(id).ok()) {
        set_producer(info, &now);
        return;
    }

    let mut info = Dictionary::new();
    set_producer(&mut info, &now);
    let info_id = doc.add_object(Object::Dictionary(info));
    doc.trailer.set("Info", Object::Reference(info_id));
}

fn set_producer(info: &mut Dictionary, now: &str) {
    info.set("Producer", Object::string_literal(PRODUCER));
    info.set("ModDate", Object::string_literal(now));
}

/// Write PDF bytes to `path` without ever leaving a partial file behind
///
/// The bytes go to a temporary file in the destination directory, which is
/// renamed over `path` once fully written. On any error the temporary file
/// is removed when it drops.
pub fn write_pdf(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| Error::Io(e.error))?;

    Ok(())
}
