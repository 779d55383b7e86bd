//! docstruct CLI - document title and outline extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use docstruct::{extract_file, DocumentStructure, JsonFormat};

#[derive(Parser)]
#[command(name = "docstruct")]
#[command(version)]
#[command(about = "Infer document titles and heading outlines", long_about = None)]
struct Cli {
    /// Input directory containing PDF files
    #[arg(value_name = "INPUT_DIR")]
    input: Option<PathBuf>,

    /// Output directory for JSON records (defaults to the input directory)
    #[arg(value_name = "OUTPUT_DIR")]
    output: Option<PathBuf>,

    /// Write compact JSON
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every PDF in a directory
    Batch {
        /// Input directory
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output directory (defaults to the input directory)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Write compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Process a single PDF and print the record to stdout
    File {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Write compact JSON
        #[arg(long)]
        compact: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Batch {
            input,
            output,
            compact,
        }) => run_batch(&input, output.as_deref(), compact),
        Some(Commands::File { input, compact }) => run_file(&input, compact),
        None => match cli.input {
            Some(input) => run_batch(&input, cli.output.as_deref(), cli.compact),
            None => {
                eprintln!("{} no input directory given; see --help", "error:".red().bold());
                std::process::exit(2);
            }
        },
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Outcome of one document in a batch.
struct BatchItem {
    name: String,
    headings: usize,
    error: Option<String>,
}

/// Process every PDF in `input`, writing one `<stem>.json` per document.
///
/// Documents are independent, so the batch runs on a rayon pool. A failed
/// document produces an error-shaped record and never aborts the batch.
fn run_batch(input: &Path, output: Option<&Path>, compact: bool) -> std::io::Result<()> {
    let output_dir = output.unwrap_or(input);
    fs::create_dir_all(output_dir)?;

    let files = collect_pdf_files(input)?;
    println!("Found {} PDF(s) to process.", files.len());
    if files.is_empty() {
        return Ok(());
    }

    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let format = json_format(compact);
    let mut items: Vec<BatchItem> = files
        .par_iter()
        .map(|file| {
            let structure = extract_file(file);
            let item = write_record(file, output_dir, &structure, format);
            bar.inc(1);
            item
        })
        .collect();
    bar.finish_and_clear();

    items.sort_by(|a, b| a.name.cmp(&b.name));
    let mut failures = 0usize;
    for item in &items {
        match &item.error {
            Some(err) => {
                failures += 1;
                println!("{} {} ({})", "failed".red().bold(), item.name, err);
            }
            None => {
                println!(
                    "{} {} ({} headings)",
                    "ok".green().bold(),
                    item.name,
                    item.headings
                );
            }
        }
    }

    println!(
        "Processed {} document(s), {} with errors.",
        items.len(),
        failures
    );
    Ok(())
}

/// Process one PDF and print its record to stdout.
fn run_file(input: &Path, compact: bool) -> std::io::Result<()> {
    let structure = extract_file(input);
    let json = render_json(&structure, json_format(compact));
    println!("{}", json);
    Ok(())
}

/// All `*.pdf` files directly inside `dir`, sorted by name.
fn collect_pdf_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Write one record next to the batch output, named after the input stem.
fn write_record(
    file: &Path,
    output_dir: &Path,
    structure: &DocumentStructure,
    format: JsonFormat,
) -> BatchItem {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let out_path = output_dir.join(format!("{}.json", stem));

    let json = render_json(structure, format);
    let write_error = fs::write(&out_path, json).err().map(|e| e.to_string());

    let error = if let Some(e) = write_error {
        Some(e)
    } else if structure.is_error() {
        Some(structure.title.clone())
    } else {
        None
    };

    BatchItem {
        name,
        headings: structure.outline.len(),
        error,
    }
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

/// Serialize a record; serialization of this shape cannot fail, but the
/// fallback keeps the CLI total.
fn render_json(structure: &DocumentStructure, format: JsonFormat) -> String {
    structure.to_json(format).unwrap_or_else(|e| {
        log::error!("serialization failed: {}", e);
        format!("{{\"title\": \"Error: {}\", \"outline\": []}}", e)
    })
}
