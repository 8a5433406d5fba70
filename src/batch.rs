//! Input sources and batch processing
//!
//! A batch is an explicit [`RecolorRequest`] in and one [`BatchOutcome`] per
//! source out. A failing source never stops the others.

use std::fmt;
use std::path::{Path, PathBuf};
use glob::glob;
use tracing::{info, warn};
use crate::color::Rgb;
use crate::error::{Error, Result};
use crate::fetch::{fetch_pdf, FetchOptions};
use crate::pdf::recolor::render;

/// Prefix given to every output file name
pub const OUTPUT_PREFIX: &str = "readbetter_";

/// Output name for sources that do not carry a usable file name
const FALLBACK_NAME: &str = "document.pdf";

/// Where a PDF comes from
#[derive(Debug, Clone)]
pub enum InputSource {
    /// A local file
    File(PathBuf),
    /// An http(s) URL to download
    Url(String),
    /// Bytes already in memory, e.g. an upload
    Memory { name: String, data: Vec<u8> },
}

impl InputSource {
    /// Classify a command-line argument as a URL or a file path
    pub fn parse(input: &str) -> Self {
        match url::Url::parse(input) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                InputSource::Url(input.to_string())
            }
            _ => InputSource::File(PathBuf::from(input)),
        }
    }

    /// Human-readable origin, used when reporting outcomes
    pub fn label(&self) -> String {
        match self {
            InputSource::File(path) => path.display().to_string(),
            InputSource::Url(url) => url.clone(),
            InputSource::Memory { name, .. } => name.clone(),
        }
    }

    /// File name the recolored document should be saved under
    pub fn output_file_name(&self) -> String {
        let base = match self {
            InputSource::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            InputSource::Memory { name, .. } => Path::new(name)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            InputSource::Url(url) => url_file_name(url),
        };

        format!("{}{}", OUTPUT_PREFIX, base.unwrap_or_else(|| FALLBACK_NAME.to_string()))
    }

    /// Read or download the source bytes
    pub fn load(&self, fetch: &FetchOptions) -> Result<Vec<u8>> {
        match self {
            InputSource::File(path) => {
                if !path.exists() {
                    return Err(Error::FileNotFound(path.clone()));
                }
                Ok(std::fs::read(path)?)
            }
            InputSource::Url(url) => fetch_pdf(url, fetch),
            InputSource::Memory { data, .. } => Ok(data.clone()),
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Last path segment of a URL, if it looks like a PDF file name
fn url_file_name(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    segment
        .to_ascii_lowercase()
        .ends_with(".pdf")
        .then(|| segment.to_string())
}

/// Expand command-line inputs into sources
///
/// URLs pass through untouched. Arguments containing glob characters are
/// expanded (sorted); anything else is taken as a literal path.
pub fn expand_sources(patterns: &[String]) -> Result<Vec<InputSource>> {
    let mut sources = Vec::new();

    for pattern in patterns {
        let source = InputSource::parse(pattern);
        if matches!(source, InputSource::Url(_)) {
            sources.push(source);
            continue;
        }

        // Check if pattern contains glob characters
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let entries = glob(pattern).map_err(|e| Error::InvalidGlob(format!("{}: {}", pattern, e)))?;

            let mut matched: Vec<PathBuf> = Vec::new();
            for entry in entries {
                match entry {
                    Ok(path) => matched.push(path),
                    Err(e) => warn!(pattern = %pattern, error = %e, "skipping unreadable glob entry"),
                }
            }

            if matched.is_empty() {
                return Err(Error::NoFilesMatched(pattern.clone()));
            }

            // Sort paths for consistent ordering
            matched.sort();
            sources.extend(matched.into_iter().map(InputSource::File));
        } else {
            sources.push(source);
        }
    }

    Ok(sources)
}

/// Everything needed to process a batch
#[derive(Debug, Clone, Default)]
pub struct RecolorRequest {
    /// Background color applied to every page of every source
    pub color: Rgb,
    /// Documents to process, in order
    pub sources: Vec<InputSource>,
    /// Limits for URL sources
    pub fetch: FetchOptions,
}

/// A successfully recolored document
#[derive(Debug, Clone)]
pub struct RecoloredPdf {
    /// Suggested output file name
    pub file_name: String,
    pub page_count: usize,
    /// Complete PDF bytes
    pub bytes: Vec<u8>,
}

/// What happened to one source
#[derive(Debug)]
pub struct BatchOutcome {
    pub source: InputSource,
    pub result: Result<RecoloredPdf>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Recolor one source
pub fn process_source(source: &InputSource, color: Rgb, fetch: &FetchOptions) -> Result<RecoloredPdf> {
    let input = source.load(fetch)?;
    let (bytes, page_count) = render(&input, color)?;

    Ok(RecoloredPdf {
        file_name: source.output_file_name(),
        page_count,
        bytes,
    })
}

/// Recolor every source in the request, independently and in order
pub fn run_batch(request: &RecolorRequest) -> Vec<BatchOutcome> {
    let outcomes: Vec<BatchOutcome> = request
        .sources
        .iter()
        .map(|source| {
            let result = process_source(source, request.color, &request.fetch);
            if let Err(e) = &result {
                warn!(source = %source, error = %e, "failed to recolor");
            }
            BatchOutcome {
                source: source.clone(),
                result,
            }
        })
        .collect();

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    info!(total = outcomes.len(), failed, "batch finished");

    outcomes
}
