//! PDF Readability Library
//!
//! Recolors the background of PDF pages (cream, grey, mint...) so long
//! documents are easier on the eyes. This library provides functionality to:
//! - Paint a solid background behind every page, keeping page sizes and
//!   annotations intact
//! - Parse hex colors and the built-in reading palette
//! - Load documents from files, URLs or memory and process them in batches
//! - Inspect page counts, sizes and annotations
//!
//! # Example
//!
//! ```no_run
//! use pdf_readability::batch::{run_batch, InputSource, RecolorRequest};
//! use pdf_readability::Preset;
//! use std::path::PathBuf;
//!
//! let request = RecolorRequest {
//!     color: Preset::SoftCream.color(),
//!     sources: vec![
//!         InputSource::File(PathBuf::from("lecture.pdf")),
//!         InputSource::parse("https://example.com/paper.pdf"),
//!     ],
//!     ..Default::default()
//! };
//!
//! for outcome in run_batch(&request) {
//!     match outcome.result {
//!         Ok(pdf) => std::fs::write(&pdf.file_name, &pdf.bytes).expect("write failed"),
//!         Err(e) => eprintln!("{}: {}", outcome.source, e),
//!     }
//! }
//! ```

pub mod batch;
pub mod color;
pub mod error;
pub mod fetch;
pub mod pdf;

// Re-export commonly used items
pub use color::{Preset, Rgb};
pub use error::{Error, Result};
pub use pdf::{recolor, recolor_file, recolor_hex};
