use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use pdfpad::{generate, GenerationRequest, PaddingDecision};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: pdfpad <output-filename> <number-of-pages> [file-size-MB]";

#[derive(Parser)]
#[command(
    name = "pdfpad",
    about = "Generate a numbered-page PDF padded to a minimum file size",
    version
)]
struct Cli {
    /// Output file path
    output: PathBuf,

    /// Number of pages to generate
    #[arg(allow_negative_numbers = true)]
    pages: String,

    /// Minimum file size in megabytes
    #[arg(allow_negative_numbers = true)]
    size_mb: Option<f64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(_) => {
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    let page_count = match cli.pages.parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => {
            eprintln!("Invalid number of pages provided.");
            process::exit(1);
        }
    };

    let mut request = GenerationRequest::new(&cli.output, page_count)?;
    if let Some(mb) = cli.size_mb {
        request = request.with_target_size_mb(mb);
    }
    tracing::debug!(
        pages = page_count,
        target = ?request.target_size(),
        "starting generation"
    );

    let summary = generate(&request)
        .with_context(|| format!("failed to generate PDF \"{}\"", cli.output.display()))?;

    match summary.decision {
        PaddingDecision::Pad(_) => {
            println!(
                "Appended {} bytes to match target size of {} MB.",
                summary.bytes_appended(),
                cli.size_mb.unwrap_or_default()
            );
        }
        PaddingDecision::AlreadyOverTarget => {
            eprintln!("Warning: The generated PDF is larger than the target file size.");
        }
        PaddingDecision::NoTarget | PaddingDecision::ExactMatch => {}
    }

    match cli.size_mb {
        Some(mb) => println!(
            "PDF file \"{}\" has been generated ({} pages, approx. {} MB).",
            cli.output.display(),
            summary.page_count,
            mb
        ),
        None => println!(
            "PDF file \"{}\" has been generated ({} pages).",
            cli.output.display(),
            summary.page_count
        ),
    }

    Ok(())
}
