//! PDF manipulation module

pub mod recolor;
pub mod metadata;

// Re-export commonly used items
pub use recolor::{recolor, recolor_document, recolor_file, recolor_hex, write_pdf, PageBox};
pub use metadata::{inspect, inspect_file, page_annotations, DocumentSummary, PageSummary};
