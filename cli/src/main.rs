//! pdf-outline CLI - infer a title and heading outline from PDF layout

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdf_outline::render::{self, JsonFormat, MarkdownStyle};
use pdf_outline::{
    extract_outlines_with_progress, DocumentReader, ExtractionResult, MemoryReader,
    OutlineExtractor, OutlineOptions, PdfReader,
};

#[derive(Parser)]
#[command(name = "pdf-outline")]
#[command(version)]
#[command(about = "Infer a title and heading outline from PDF text layout", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the outline of one document
    Outline {
        /// Input PDF file (or JSON fragment dump with --fragments)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Treat the input as a JSON fragment dump instead of a PDF
        #[arg(long)]
        fragments: bool,

        #[command(flatten)]
        heuristics: HeuristicArgs,
    },

    /// Extract outlines of every PDF in a directory
    Batch {
        /// Directory containing PDF files
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output directory for <name>.json results
        #[arg(short, long, value_name = "DIR", env = "PDF_OUTLINE_OUTPUT_DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        heuristics: HeuristicArgs,
    },

    /// Dump the raw fragment stream of a PDF as JSON
    Fragments {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone, Default)]
struct HeuristicArgs {
    /// Maximum vertical gap for merging fragments
    #[arg(long, value_name = "UNITS")]
    gap: Option<f32>,

    /// Number of heading levels (1-3)
    #[arg(long, value_name = "N")]
    levels: Option<usize>,

    /// Cluster font sizes within this tolerance before ranking
    #[arg(long, value_name = "EPS")]
    tolerance: Option<f32>,
}

impl HeuristicArgs {
    fn to_options(&self) -> OutlineOptions {
        let mut options = OutlineOptions::new();
        if let Some(gap) = self.gap {
            options = options.with_max_vertical_gap(gap);
        }
        if let Some(levels) = self.levels {
            options = options.with_heading_levels(levels);
        }
        if let Some(tolerance) = self.tolerance {
            options = options.with_size_tolerance(tolerance);
        }
        options
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// {"title", "outline"} JSON
    Json,
    /// Nested Markdown bullet list
    Markdown,
    /// Markdown headings
    Headings,
}

/// Where batch results are written.
#[derive(Debug, Clone)]
struct OutputLayout {
    output_dir: PathBuf,
}

impl OutputLayout {
    fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Default layout: `<input>_outline` next to the input directory.
    fn for_input(input: &Path) -> Self {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "pdf".to_string());
        Self::new(input.with_file_name(format!("{}_outline", name)))
    }

    fn result_path(&self, input: &Path) -> PathBuf {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        self.output_dir.join(format!("{}.json", stem))
    }

    /// Result paths for a batch, in input order.
    ///
    /// Inputs whose stems collide (ignoring case, e.g. `a.pdf` and `a.PDF`)
    /// keep their full file name: `a.pdf.json`, `a.PDF.json`.
    fn result_paths(&self, inputs: &[PathBuf]) -> Vec<PathBuf> {
        let stem_key = |path: &PathBuf| {
            path.file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_lowercase()
        };

        let mut stem_counts: HashMap<String, usize> = HashMap::new();
        for input in inputs {
            *stem_counts.entry(stem_key(input)).or_default() += 1;
        }

        inputs
            .iter()
            .map(|input| {
                if stem_counts.get(&stem_key(input)).copied().unwrap_or(0) > 1 {
                    let name = input.file_name().unwrap_or_default().to_string_lossy();
                    self.output_dir.join(format!("{}.json", name))
                } else {
                    self.result_path(input)
                }
            })
            .collect()
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Outline {
            input,
            output,
            format,
            compact,
            fragments,
            heuristics,
        }) => cmd_outline(
            &input,
            output.as_deref(),
            format,
            compact,
            fragments,
            &heuristics,
        ),
        Some(Commands::Batch {
            input,
            output,
            heuristics,
        }) => {
            let layout = output
                .map(OutputLayout::new)
                .unwrap_or_else(|| OutputLayout::for_input(&input));
            cmd_batch(&input, &layout, &heuristics)
        }
        Some(Commands::Fragments { input, output }) => cmd_fragments(&input, output.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: print the outline if input is provided
            if let Some(input) = cli.input {
                cmd_outline(
                    &input,
                    None,
                    OutputFormat::Json,
                    false,
                    false,
                    &HeuristicArgs::default(),
                )
            } else {
                println!("{}", "Usage: pdf-outline <FILE>".yellow());
                println!("       pdf-outline --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_outline(
    input: &Path,
    output: Option<&Path>,
    format: OutputFormat,
    compact: bool,
    fragments: bool,
    heuristics: &HeuristicArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = OutlineExtractor::new(heuristics.to_options())?;

    let result = if fragments {
        extractor.extract(&MemoryReader::from_json_file(input)?)?
    } else {
        extractor.extract(&PdfReader::open(input)?)?
    };

    let rendered = render_result(&result, format, compact)?;
    write_or_print(output, &rendered)
}

fn render_result(
    result: &ExtractionResult,
    format: OutputFormat,
    compact: bool,
) -> pdf_outline::Result<String> {
    match format {
        OutputFormat::Json => {
            let json_format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            render::to_json(result, json_format)
        }
        OutputFormat::Markdown => Ok(render::to_markdown(result)),
        OutputFormat::Headings => Ok(render::to_markdown_with_style(
            result,
            MarkdownStyle::Headings,
        )),
    }
}

fn cmd_batch(
    input: &Path,
    layout: &OutputLayout,
    heuristics: &HeuristicArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let pdfs = collect_pdfs(input)?;
    if pdfs.is_empty() {
        println!("{} {}", "No PDF files found in".yellow(), input.display());
        return Ok(());
    }

    log::debug!(
        "Found {} PDF files in {}, writing to {}",
        pdfs.len(),
        input.display(),
        layout.output_dir.display()
    );
    fs::create_dir_all(&layout.output_dir)?;

    let pb = ProgressBar::new(pdfs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Extracting outlines...");

    let results = extract_outlines_with_progress(&pdfs, heuristics.to_options(), |_| pb.inc(1))?;
    pb.finish_with_message("Done!");

    let inputs: Vec<PathBuf> = results.iter().map(|(path, _)| path.clone()).collect();
    let targets = layout.result_paths(&inputs);

    let mut failures = 0usize;
    for ((path, result), target) in results.iter().zip(&targets) {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        match result {
            Ok(result) => {
                fs::write(target, render::to_json(result, JsonFormat::Pretty)?)?;
                println!(
                    "  {} {} {} {}",
                    "✓".green(),
                    name,
                    "→".dimmed(),
                    target.display()
                );
            }
            Err(e) => {
                failures += 1;
                println!("  {} {}: {}", "✗".red(), name, e);
            }
        }
    }

    println!(
        "\n{} {} extracted, {} failed",
        "Summary:".bold(),
        results.len() - failures,
        failures
    );

    Ok(())
}

/// PDF files directly inside `dir`, sorted by name.
fn collect_pdfs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut pdfs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                    .unwrap_or(false)
        })
        .collect();
    pdfs.sort();
    Ok(pdfs)
}

fn cmd_fragments(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let reader = PdfReader::open(input)?;
    let mut dump = MemoryReader::new();
    for page_number in 1..=reader.page_count() {
        dump.push_page(reader.page_fragments(page_number)?);
    }
    write_or_print(output, &dump.to_json()?)
}

fn write_or_print(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_version() {
    println!(
        "{} {}",
        "pdf-outline".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("Heading outline inference from PDF text layout");
    println!();
    println!("License: MIT");
}
