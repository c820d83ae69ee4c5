//! CLI binary for pdfprose.
//!
//! A thin shim over the library crate that maps CLI flags to `CleanConfig`
//! and prints or saves the cleaned text.

use anyhow::{bail, Context, Result};
use clap::Parser;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use pdfprose::{
    extract, extract_figures, extract_stream, extract_to_file, inspect, save_text, CleanConfig,
    CleanMode, ExtractionProgressCallback, ExtractionStats, LineEnding, PageSelection,
    PatternTable, ProgressCallback, DEFAULT_MIN_FIGURE_BYTES,
};
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Batch progress bar with one log line per finished document. Documents
/// complete out of order, so start times are keyed by input index.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} documents  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        bar.set_style(style);
        bar.set_prefix("Extracting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn elapsed_secs(&self, index: usize) -> f64 {
        self.start_times
            .lock()
            .unwrap()
            .remove(&index)
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Extracting {total_documents} documents…"))
        ));
    }

    fn on_document_start(&self, index: usize, input: &str) {
        self.start_times.lock().unwrap().insert(index, Instant::now());
        self.bar.set_message(input.to_string());
    }

    fn on_document_complete(&self, index: usize, input: &str, text_len: usize) {
        let secs = self.elapsed_secs(index);
        self.bar.println(format!(
            "  {} {:<40}  {:<12}  {}",
            green("✓"),
            short(input, 40),
            dim(&format!("{text_len:>7} bytes")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, index: usize, input: &str, error: &str) {
        let secs = self.elapsed_secs(index);
        self.errors.fetch_add(1, Ordering::SeqCst);
        let first_line = error.lines().next().unwrap_or(error);
        self.bar.println(format!(
            "  {} {:<40}  {}  {}",
            red("✗"),
            short(input, 40),
            red(&short(first_line, 80)),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_documents: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let failed = self.errors.load(Ordering::SeqCst);
        if failed == 0 {
            eprintln!(
                "{} {} documents extracted",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} documents extracted  ({} failed)",
                if failed == total_documents {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_documents,
                red(&failed.to_string()),
            );
        }
    }
}

/// Truncate to `max` characters with an ellipsis.
fn short(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}\u{2026}")
    } else {
        s.to_string()
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Clean one paper (stdout)
  pdfprose paper.pdf

  # Write to a file
  pdfprose paper.pdf -o paper.txt

  # Save a whole folder, one <title-slug>.txt per PDF
  pdfprose --out-dir texts/ corpus/*.pdf

  # Only pages 2-12, keep publisher cover pages
  pdfprose --pages 2-12 --keep-cover-pages paper.pdf

  # Ligatures and whitespace only, no boilerplate removal or rejoining
  pdfprose --raw paper.pdf

  # Add your own publisher rules
  pdfprose --patterns my-journals.toml paper.pdf

  # Start a pattern file from the built-in table
  pdfprose --dump-patterns > my-journals.toml

  # See how the rejoiner reads each line
  pdftotext -layout paper.pdf - | pdfprose --classify

  # Inspect PDF metadata
  pdfprose --inspect-only paper.pdf

  # Save the text and the paper's figures
  pdfprose paper.pdf -o paper.txt --figures figures/

PATTERN FILES:
  TOML, appended to the built-in table unless `replace_defaults = true`:

    skip_page_markers = ["Downloaded via"]

    [[line_rules]]
    name = "hydrology-header"
    pattern = '^Journal of Hydrology \d+ \(\d{4}\) \d+\s*$'

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium, or the directory containing it
  RUST_LOG          Overrides the log filter (e.g. pdfprose=debug)
  PDFPROSE_*        Fallback for most flags (see --help for each)
"#;

/// Reconstruct readable prose from academic PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "pdfprose",
    version,
    about = "Reconstruct readable prose from academic PDFs",
    long_about = "Extract the text layer of academic PDFs (local files or URLs) and clean it: \
drop publisher cover pages, strip running headers, licence notices and page numbers, fix \
ligatures and rejoin lines broken mid-sentence into paragraphs.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file paths or HTTP/HTTPS URLs.
    #[arg(required_unless_present_any = ["dump_patterns", "classify"])]
    inputs: Vec<String>,

    /// Write the cleaned text to this file instead of stdout (single input).
    #[arg(short, long, env = "PDFPROSE_OUTPUT", conflicts_with = "out_dir")]
    output: Option<PathBuf>,

    /// Save each document as <dir>/<title-slug>.txt.
    #[arg(long, env = "PDFPROSE_OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// Title used for the --out-dir file name (single input).
    #[arg(long)]
    title: Option<String>,

    /// Ligatures and whitespace only: no page filter, no boilerplate
    /// stripping, no rejoining.
    #[arg(long, env = "PDFPROSE_RAW")]
    raw: bool,

    /// Keep cover and citation pages added by publishers.
    #[arg(long, env = "PDFPROSE_KEEP_COVER_PAGES")]
    keep_cover_pages: bool,

    /// Page selection: all, 5, 3-15, or 1,3,7-9.
    #[arg(long, env = "PDFPROSE_PAGES", default_value = "all")]
    pages: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFPROSE_PASSWORD")]
    password: Option<String>,

    /// TOML pattern file with extra publisher rules.
    #[arg(long, env = "PDFPROSE_PATTERNS")]
    patterns: Option<PathBuf>,

    /// Print the effective pattern table as TOML and exit.
    #[arg(long)]
    dump_patterns: bool,

    /// Classify lines read from stdin (or the given text files) and exit.
    #[arg(long)]
    classify: bool,

    /// Output structured JSON instead of plain text.
    #[arg(long, env = "PDFPROSE_JSON")]
    json: bool,

    /// Print page and text statistics to stderr.
    #[arg(long)]
    stats: bool,

    /// Number of documents processed at once.
    #[arg(short, long, env = "PDFPROSE_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Also write embedded figures (figure_1.png, ...) to this directory.
    /// Batches get one subdirectory per document.
    #[arg(long, env = "PDFPROSE_FIGURES")]
    figures: Option<PathBuf>,

    /// Smallest image, in encoded bytes, saved as a figure.
    #[arg(long, env = "PDFPROSE_MIN_FIGURE_BYTES", default_value_t = DEFAULT_MIN_FIGURE_BYTES)]
    min_figure_bytes: usize,

    /// Print PDF metadata only, no extraction.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFPROSE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFPROSE_QUIET")]
    quiet: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDFPROSE_NO_PROGRESS")]
    no_progress: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDFPROSE_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar only runs for batches; library INFO logs would
    // interleave with it.
    let batch = cli.out_dir.is_some() || cli.inputs.len() > 1;
    let show_progress = batch && !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Pattern table dump ───────────────────────────────────────────────
    if cli.dump_patterns {
        let toml = config
            .cleaner
            .table()
            .to_toml()
            .context("Failed to serialise pattern table")?;
        print!("{toml}");
        return Ok(());
    }

    // ── Line classification ──────────────────────────────────────────────
    if cli.classify {
        return run_classify(&cli, &config);
    }

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        for input in &cli.inputs {
            let meta = inspect(input, &config)
                .await
                .with_context(|| format!("Failed to inspect {input}"))?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
                );
            } else {
                println!("File:         {}", input);
                if let Some(ref t) = meta.title {
                    println!("Title:        {}", t);
                }
                if let Some(ref a) = meta.author {
                    println!("Author:       {}", a);
                }
                if let Some(ref s) = meta.subject {
                    println!("Subject:      {}", s);
                }
                println!("Pages:        {}", meta.page_count);
                println!("PDF Version:  {}", meta.pdf_version);
                if let Some(ref p) = meta.producer {
                    println!("Producer:     {}", p);
                }
                if let Some(ref c) = meta.creator {
                    println!("Creator:      {}", c);
                }
                if let Some(ref d) = meta.creation_date {
                    println!("Created:      {}", d);
                }
            }
        }
        return Ok(());
    }

    if batch {
        return run_batch(&cli, &config).await;
    }

    // ── Single document ──────────────────────────────────────────────────
    let Some(input) = cli.inputs.first() else {
        bail!("No input given");
    };

    if let Some(ref output_path) = cli.output {
        if cli.json {
            let output = extract(input, &config)
                .await
                .context("Extraction failed")?;
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            tokio::fs::write(output_path, json)
                .await
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            report(&cli, &output.stats, Some(output_path));
        } else {
            let stats = extract_to_file(input, output_path, &config)
                .await
                .context("Extraction failed")?;
            report(&cli, &stats, Some(output_path));
        }
        if let Some(ref dir) = cli.figures {
            save_figures(&cli, &config, input, dir, true).await?;
        }
        return Ok(());
    }

    let output = extract(input, &config)
        .await
        .context("Extraction failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.text.as_bytes())
            .context("Failed to write to stdout")?;
        if !output.text.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }
    report(&cli, &output.stats, None);

    if let Some(ref dir) = cli.figures {
        save_figures(&cli, &config, input, dir, true).await?;
    }

    Ok(())
}

/// Extract many documents into `--out-dir`.
async fn run_batch(cli: &Cli, config: &CleanConfig) -> Result<()> {
    let Some(ref out_dir) = cli.out_dir else {
        bail!("Multiple inputs need --out-dir");
    };
    let title_override = if cli.inputs.len() == 1 {
        cli.title.clone()
    } else {
        None
    };

    let mut results = extract_stream(cli.inputs.clone(), config);
    let mut failed = 0usize;
    let mut summaries = Vec::new();

    while let Some(result) = results.next().await {
        match result.output {
            Ok(output) => {
                let title = title_override
                    .clone()
                    .or_else(|| output.metadata.title.clone())
                    .unwrap_or_else(|| input_stem(&result.input));
                let path = save_text(&output.text, &title, out_dir)
                    .await
                    .with_context(|| format!("Failed to save text for {}", result.input))?;
                if let Some(ref root) = cli.figures {
                    let stem = path.file_stem().unwrap_or_default();
                    let announce = config.progress_callback.is_none();
                    save_figures(cli, config, &result.input, &root.join(stem), announce).await?;
                }
                if cli.json {
                    summaries.push(serde_json::json!({
                        "index": result.index,
                        "input": result.input,
                        "path": path,
                        "stats": output.stats,
                    }));
                } else if !cli.quiet && config.progress_callback.is_none() {
                    eprintln!("{} → {}", result.input, path.display());
                }
            }
            Err(e) => {
                failed += 1;
                if cli.json {
                    summaries.push(serde_json::json!({
                        "index": result.index,
                        "input": result.input,
                        "error": e,
                    }));
                } else if config.progress_callback.is_none() {
                    eprintln!("{} {}", red("✗"), e);
                }
            }
        }
    }

    if cli.json {
        summaries.sort_by_key(|s| s["index"].as_u64().unwrap_or(u64::MAX));
        println!(
            "{}",
            serde_json::to_string_pretty(&summaries).context("Failed to serialise summary")?
        );
    }

    if failed > 0 {
        bail!("{} of {} documents failed", failed, cli.inputs.len());
    }
    Ok(())
}

/// Write the figures of one document into `dir`.
async fn save_figures(
    cli: &Cli,
    config: &CleanConfig,
    input: &str,
    dir: &Path,
    announce: bool,
) -> Result<()> {
    let figures = extract_figures(input, dir, config)
        .await
        .with_context(|| format!("Failed to extract figures from {input}"))?;
    if announce && !cli.quiet && !cli.json {
        eprintln!(
            "{}  {} figure(s)  →  {}",
            green("✔"),
            figures.len(),
            bold(&dir.display().to_string())
        );
    }
    Ok(())
}

/// Print a classification line for every line of the input text.
fn run_classify(cli: &Cli, config: &CleanConfig) -> Result<()> {
    let mut text = String::new();
    if cli.inputs.is_empty() || cli.inputs.iter().any(|i| i == "-") {
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
    }
    for input in cli.inputs.iter().filter(|i| *i != "-") {
        let content =
            std::fs::read_to_string(input).with_context(|| format!("Failed to read {input}"))?;
        text.push_str(&content);
        text.push('\n');
    }

    let cleaner = &config.cleaner;
    let mut rows = Vec::new();
    for line in text.lines().map(str::trim) {
        let class = cleaner.classify_line(line);
        let ending = cleaner.line_ending(line);
        if cli.json {
            rows.push(serde_json::json!({
                "line": line,
                "is_heading": class.is_heading,
                "ends_sentence": class.ends_sentence,
                "ending": ending,
            }));
        } else {
            println!(
                "{} {:<12} {}",
                if class.is_heading { "H" } else { "." },
                ending_label(ending),
                line
            );
        }
    }

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).context("Failed to serialise classification")?
        );
    }
    Ok(())
}

fn ending_label(ending: LineEnding) -> &'static str {
    match ending {
        LineEnding::Empty => "empty",
        LineEnding::Terminal => "terminal",
        LineEnding::Citation => "citation",
        LineEnding::Colon => "colon",
        LineEnding::Continuation => "continues",
        LineEnding::Unterminated => "open",
    }
}

/// Summary line on stderr, plus the full block with `--stats`.
fn report(cli: &Cli, stats: &ExtractionStats, path: Option<&Path>) {
    if cli.quiet {
        return;
    }
    if !cli.json {
        let target = path
            .map(|p| format!("  →  {}", bold(&p.display().to_string())))
            .unwrap_or_default();
        eprintln!(
            "{}  {}/{} pages kept  {}ms{}",
            green("✔"),
            stats.kept_pages,
            stats.selected_pages,
            stats.total_duration_ms,
            target,
        );
    }
    if cli.stats {
        eprintln!("   pages:      {} total, {} selected", stats.total_pages, stats.selected_pages);
        eprintln!(
            "   dropped:    {} cover, {} blank",
            stats.cover_pages, stats.blank_pages
        );
        eprintln!(
            "   text:       {} characters, {} words, {} paragraphs",
            stats.text.characters, stats.text.words, stats.text.paragraphs
        );
        eprintln!(
            "   timing:     {}",
            dim(&format!(
                "extract {}ms, clean {}ms",
                stats.extract_duration_ms, stats.clean_duration_ms
            ))
        );
    }
}

/// Map CLI args to `CleanConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<CleanConfig> {
    let pages: PageSelection = cli
        .pages
        .parse()
        .with_context(|| format!("Invalid --pages value '{}'", cli.pages))?;

    let mut builder = CleanConfig::builder()
        .mode(if cli.raw { CleanMode::Raw } else { CleanMode::Full })
        .skip_cover_pages(!cli.keep_cover_pages)
        .pages(pages)
        .concurrency(cli.concurrency)
        .download_timeout_secs(cli.download_timeout)
        .min_figure_bytes(cli.min_figure_bytes);

    if let Some(ref path) = cli.patterns {
        let table = PatternTable::load(path)
            .with_context(|| format!("Failed to load pattern file {}", path.display()))?;
        builder = builder.pattern_table(table);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// File stem of a path or URL, for documents without a title.
fn input_stem(input: &str) -> String {
    let last = input.rsplit(['/', '\\']).next().unwrap_or(input);
    Path::new(last)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "untitled".to_string())
}
