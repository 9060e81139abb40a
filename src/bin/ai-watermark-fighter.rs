use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use ai_watermark_fighter::{
    collect_image_paths, MarginRatio, Operation, OutputFormat, ProcessOptions, ProcessResult,
    Summary, Transformer,
};

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Add a white margin to the right and bottom
    Enlarge,
    /// Crop a previously added margin back off
    Restore,
}

impl From<Mode> for Operation {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Enlarge => Operation::Enlarge,
            Mode::Restore => Operation::Restore,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "ai-watermark-fighter",
    about = "Pad images with a white margin before watermarking, and crop it off afterwards",
    version,
    after_help = "Examples:\n  \
                  ai-watermark-fighter enlarge image.jpg\n  \
                  ai-watermark-fighter enlarge '*.jpg' --output-dir ./processed\n  \
                  ai-watermark-fighter restore image-enlarge.jpg\n  \
                  ai-watermark-fighter enlarge ./images/ -o ./output -f PNG\n\n\
                  Outputs are named <name>-enlarge.<ext> or <name>-restore.<ext>."
)]
struct Cli {
    /// Operation to perform
    operation: Mode,

    /// Input files, directories, or glob patterns
    #[arg(required = true)]
    input: Vec<String>,

    /// Output directory (default: next to each input file)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format: PNG, JPG or WEBP (default: keep the input format)
    #[arg(short, long, value_parser = parse_format)]
    format: Option<OutputFormat>,

    /// Margin added to each side, as a fraction of that side
    #[arg(long, default_value = "0.1", value_parser = parse_ratio)]
    ratio: MarginRatio,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse().map_err(|e: ai_watermark_fighter::Error| e.to_string())
}

fn parse_ratio(s: &str) -> Result<MarginRatio, String> {
    let value: f64 = s.parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    MarginRatio::new(value).map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let opts = ProcessOptions {
        operation: cli.operation.into(),
        output_dir: cli.output_dir,
        format: cli.format,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    if let Some(dir) = &opts.output_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("Error: Failed to create output directory {}: {e}", dir.display());
            process::exit(1);
        }
    }

    let mut inputs = Vec::new();
    for spec in &cli.input {
        let paths = collect_image_paths(spec);
        if paths.is_empty() {
            eprintln!("Warning: No files found for '{spec}'");
        }
        inputs.extend(paths);
    }

    if inputs.is_empty() {
        eprintln!("Error: No input files found");
        process::exit(1);
    }

    if opts.verbose {
        eprintln!("Found {} images to {}", inputs.len(), opts.operation);
        eprintln!("Margin ratio: {}", cli.ratio);
        if let Some(dir) = &opts.output_dir {
            eprintln!("Output directory: {}", dir.display());
        }
        eprintln!();
    }

    let transformer = Transformer::new(cli.ratio);
    let results = transformer.process_all(&inputs, &opts);

    for r in &results {
        print_result(r, &opts);
    }

    let summary = Summary::from_results(&results);
    if !opts.quiet {
        eprintln!();
        eprint!("[Summary] Processed: {}", summary.succeeded);
        if summary.failed > 0 {
            eprint!(", Failed: {}", summary.failed);
        }
        eprintln!(" (Total: {})", summary.total());
    }

    if !summary.all_succeeded() {
        process::exit(1);
    }
}

fn print_result(result: &ProcessResult, opts: &ProcessOptions) {
    if result.success {
        if opts.quiet {
            return;
        }
        match &result.output {
            Some(out) => eprintln!("[OK] {} -> {}", result.path.display(), out.display()),
            None => eprintln!("[OK] {}", result.path.display()),
        }
        if opts.verbose {
            eprintln!("  -> {}", result.message);
        }
    } else {
        eprintln!("[FAIL] {}: {}", result.path.display(), result.message);
    }
}
