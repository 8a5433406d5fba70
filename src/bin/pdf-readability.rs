//! PDF Readability CLI tool
//!
//! A command-line tool that paints a reading-friendly background color
//! behind every page of one or more PDFs.

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdf_readability::batch::{expand_sources, run_batch, RecolorRequest};
use pdf_readability::fetch::FetchOptions;
use pdf_readability::pdf::{inspect_file, write_pdf};
use pdf_readability::{Preset, Rgb};

/// PDF Readability - Recolor PDF page backgrounds for easier reading
#[derive(Parser)]
#[command(name = "pdf-readability")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Classic yellow background, written to readbetter_paper.pdf
    pdf-readability recolor paper.pdf

    # Grey background from the palette, into an output folder
    pdf-readability recolor --preset medium-grey -d out/ \"chapters/*.pdf\"

    # Custom color, explicit output file
    pdf-readability recolor --color F0F5FA -o slides-blue.pdf slides.pdf

    # Download and recolor a paper, then open it
    pdf-readability recolor --open https://example.com/paper.pdf")]
struct Cli {
    /// Increase log detail (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Paint a background color behind every page of each input
    Recolor {
        /// Input PDF files or http(s) URLs. Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output PDF file path (single input only)
        #[arg(short, long, conflicts_with = "out_dir")]
        output: Option<PathBuf>,

        /// Directory for readbetter_* output files (defaults to the current directory)
        #[arg(short = 'd', long)]
        out_dir: Option<PathBuf>,

        /// Background color as six hex digits, e.g. F7F1E4 (a leading # is accepted)
        #[arg(short, long, value_parser = parse_color, conflicts_with = "preset")]
        color: Option<Rgb>,

        /// Palette color by number or name (see the `presets` command)
        #[arg(short, long, value_parser = parse_preset)]
        preset: Option<Preset>,

        /// Download timeout in seconds for URL inputs
        #[arg(long, default_value_t = 30)]
        timeout: u64,

        /// Largest download accepted for URL inputs, in MiB
        #[arg(long, default_value_t = 100)]
        max_download_mb: u64,

        /// Open the output files after creation
        #[arg(long)]
        open: bool,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },

    /// List the built-in background colors
    Presets,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Recolor {
            inputs, output, out_dir, color, preset, timeout, max_download_mb, open,
        } => {
            let fetch = FetchOptions {
                timeout: Duration::from_secs(timeout),
                max_bytes: max_download_mb.saturating_mul(1024 * 1024),
            };
            let color = color
                .or_else(|| preset.map(Preset::color))
                .unwrap_or_default();
            cmd_recolor(inputs, output, out_dir, color, fetch, open)
        }
        Commands::Info { input } => {
            cmd_info(&input)
        }
        Commands::Presets => {
            cmd_presets();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "pdf_readability=warn",
        1 => "pdf_readability=info",
        _ => "pdf_readability=debug",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Color picker values come with a leading '#'
fn parse_color(value: &str) -> Result<Rgb, String> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    Rgb::from_hex(hex).map_err(|e| e.to_string())
}

fn parse_preset(value: &str) -> Result<Preset, String> {
    value.parse::<Preset>().map_err(|e| e.to_string())
}

/// Open a file with the system default application
fn open_file(path: &Path) -> anyhow::Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

/// Pick a path not already written during this run: name.pdf, name-2.pdf, ...
fn unique_path(dir: &Path, file_name: &str, taken: &mut HashSet<PathBuf>) -> PathBuf {
    let candidate = dir.join(file_name);
    if taken.insert(candidate.clone()) {
        return candidate;
    }

    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());

    (2..)
        .map(|n| dir.join(format!("{}-{}.pdf", stem, n)))
        .find(|path| taken.insert(path.clone()))
        .unwrap_or(candidate)
}

/// Recolor every input and write the results
fn cmd_recolor(
    inputs: Vec<String>,
    output: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    color: Rgb,
    fetch: FetchOptions,
    open: bool,
) -> anyhow::Result<()> {
    let sources = expand_sources(&inputs)?;

    if output.is_some() && sources.len() != 1 {
        bail!(
            "--output takes exactly one input, got {} (use --out-dir instead)",
            sources.len()
        );
    }

    let out_dir = out_dir.unwrap_or_else(|| PathBuf::from("."));
    if output.is_none() {
        std::fs::create_dir_all(&out_dir)
            .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    }

    let request = RecolorRequest { color, sources, fetch };
    let total = request.sources.len();

    eprintln!("Recoloring {} PDF file(s) with #{}...", total, color);

    let mut taken = HashSet::new();
    let mut written = Vec::new();
    let mut failed = 0;

    for outcome in run_batch(&request) {
        let pdf = match outcome.result {
            Ok(pdf) => pdf,
            Err(e) => {
                eprintln!("Error processing {}: {}", outcome.source, e);
                failed += 1;
                continue;
            }
        };

        let path = match &output {
            Some(path) => path.clone(),
            None => unique_path(&out_dir, &pdf.file_name, &mut taken),
        };

        match write_pdf(&path, &pdf.bytes) {
            Ok(()) => {
                eprintln!("{} -> {} ({} pages)", outcome.source, path.display(), pdf.page_count);
                written.push(path);
            }
            Err(e) => {
                eprintln!("Error writing {}: {}", path.display(), e);
                failed += 1;
            }
        }
    }

    if open {
        for path in &written {
            if let Err(e) = open_file(path) {
                eprintln!("Warning: could not open {}: {}", path.display(), e);
            }
        }
    }

    batch_status(failed, total)
}

/// Any failed document makes the whole run fail, so the exit code is non-zero
fn batch_status(failed: usize, total: usize) -> anyhow::Result<()> {
    if failed > 0 {
        bail!("{} of {} documents failed", failed, total);
    }
    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: &Path) -> anyhow::Result<()> {
    let summary = inspect_file(input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", summary.page_count);

    if let Some(title) = summary.title {
        println!("Title: {}", title);
    }
    if let Some(author) = summary.author {
        println!("Author: {}", author);
    }
    if let Some(producer) = summary.producer {
        println!("Producer: {}", producer);
    }

    for page in &summary.pages {
        println!(
            "  Page {}: {:.2} x {:.2} pt, {} annotation(s)",
            page.number, page.width, page.height, page.annotations
        );
    }

    Ok(())
}

/// List the palette
fn cmd_presets() {
    for preset in Preset::ALL {
        let marker = if preset == Preset::ClassicYellow { " (default)" } else { "" };
        println!("{}  {:<15} #{}{}", preset.number(), preset.name(), preset.color(), marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_path_numbers_duplicates() {
        let dir = Path::new("out");
        let mut taken = HashSet::new();

        let names: Vec<PathBuf> = (0..3)
            .map(|_| unique_path(dir, "readbetter_document.pdf", &mut taken))
            .collect();

        assert_eq!(names, [
            dir.join("readbetter_document.pdf"),
            dir.join("readbetter_document-2.pdf"),
            dir.join("readbetter_document-3.pdf"),
        ]);
        assert_eq!(unique_path(dir, "readbetter_other.pdf", &mut taken), dir.join("readbetter_other.pdf"));
    }

    #[test]
    fn test_batch_status_fails_on_any_error() {
        assert!(batch_status(0, 3).is_ok());

        let err = batch_status(1, 3).unwrap_err();
        assert_eq!(err.to_string(), "1 of 3 documents failed");
    }

    #[test]
    fn test_parse_color_strips_hash() {
        assert_eq!(parse_color("#F7F1E4").unwrap(), Rgb::new(0xF7, 0xF1, 0xE4));
        assert_eq!(parse_color("bfbab7").unwrap(), Rgb::new(0xBF, 0xBA, 0xB7));
        assert!(parse_color("##F7F1E4").is_err());
    }

    #[test]
    fn test_cli_rejects_color_with_preset() {
        let result = Cli::try_parse_from([
            "pdf-readability", "recolor", "--color", "F7F1E4", "--preset", "2", "a.pdf",
        ]);
        assert!(result.is_err());
    }
}
