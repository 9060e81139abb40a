//! Enlarge an image, then restore it, reporting both sizes.
//!
//! Usage:
//! ```sh
//! cargo run --example round_trip -- input.png [PNG|JPG|WEBP]
//! ```
//!
//! An unrecognized format name falls back to PNG with a warning.

use std::env;
use std::path::Path;
use std::process;

use ai_watermark_fighter::{Operation, OutputFormat, ProcessOptions, Transformer};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <input> [format]", args[0]);
        process::exit(1);
    }

    let transformer = Transformer::default();
    let input = Path::new(&args[1]);
    let format = args.get(2).map(String::as_str).map(OutputFormat::resolve);

    let enlarge = ProcessOptions {
        format,
        ..ProcessOptions::default()
    };
    let enlarged = transformer.process_file(input, &enlarge);
    let Some(enlarged_path) = enlarged.output else {
        eprintln!("Error: {}", enlarged.message);
        process::exit(1);
    };
    println!("Enlarged: {} ({})", enlarged_path.display(), enlarged.message);

    let restore = ProcessOptions {
        operation: Operation::Restore,
        format,
        ..ProcessOptions::default()
    };
    let restored = transformer.process_file(&enlarged_path, &restore);
    if restored.success {
        if let Some(path) = &restored.output {
            println!("Restored: {} ({})", path.display(), restored.message);
        }
    } else {
        eprintln!("Error: {}", restored.message);
        process::exit(1);
    }
}
