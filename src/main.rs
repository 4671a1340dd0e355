use clap::Parser;
use image::ImageReader;
use std::path::PathBuf;

use tablesnip::detection::ocr::{CellRecognizer, OcrsRecognizer};
use tablesnip::{output, TableError, TablePipeline};

#[derive(Parser)]
#[command(name = "tablesnip")]
#[command(about = "Extract table cells from scanned document images")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Skip OCR step (faster, for testing geometry recovery only)
    #[arg(long)]
    skip_ocr: bool,

    /// Write recognized cell text as CSV to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    if args.verbose {
        println!("Loading image: {:?}", args.image_path);
    }

    let img = ImageReader::open(&args.image_path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;

    if args.verbose {
        println!("Image loaded: {}x{}\n", img.width(), img.height());
    }

    let mut pipeline = TablePipeline::new().with_verbose(args.verbose);
    if let Some(debug_dir) = args.debug_out {
        pipeline = pipeline.with_debug(debug_dir)?;
    }

    let table = match pipeline.extract(&img) {
        Ok(table) => table,
        Err(e) => {
            // Malformed inputs are expected in batch use; report them as a
            // skip rather than a crash.
            if let Some(table_err) = e.downcast_ref::<TableError>() {
                eprintln!("{}: {}", args.image_path.display(), table_err);
                std::process::exit(1);
            }
            return Err(e);
        }
    };

    println!("\n=== Table Extraction Results ===");
    println!(
        "Grid: {} rows x {} columns ({} cells)",
        table.rows,
        table.columns,
        table.cells.len()
    );

    if args.skip_ocr {
        return Ok(());
    }

    if args.verbose {
        println!("\nInitializing OCR engine...");
    }
    let recognizer = OcrsRecognizer::new()?;

    let mut texts = Vec::with_capacity(table.cells.len());
    for (i, cell) in table.cells.iter().enumerate() {
        if args.verbose {
            println!("  Recognizing cell {} of {}...", i + 1, table.cells.len());
        }
        let raw = recognizer.recognize(cell)?;
        texts.push(output::clean_cell_text(&raw));
    }

    let csv = output::rows_to_csv(&texts, table.columns);
    match args.out {
        Some(path) => {
            std::fs::write(&path, &csv)?;
            println!("Wrote {} rows to {}", table.rows, path.display());
        }
        None => print!("{}", csv),
    }

    Ok(())
}
