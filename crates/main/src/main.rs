use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use letterhead::{generate_document, inspect, sample, LetterConfig, LetterContent, LetterError};
use log::debug;

/// Renders letters on the company letterhead.
///
/// Fonts and the logo are read from `assets/` next to the working directory or
/// the binary; every asset is optional. Set `RUST_LOG=info` to see what was
/// generated and `RUST_LOG=debug` to see how malformed content was handled.
#[derive(Parser)]
#[command(author, version, about = "Letterhead PDF generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a letter from a JSON content file.
    Generate {
        /// JSON file with date, recipient, title, salutation, body, closing and signature.
        content: PathBuf,
        /// Where to write the PDF.
        #[arg(short, long, default_value = "letter.pdf")]
        output: PathBuf,
        /// JSON configuration overriding the stock letterhead.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Render the sample partnership proposal dated today.
    Sample {
        /// Where to write the PDF.
        #[arg(short, long, default_value = sample::SAMPLE_OUTPUT)]
        output: PathBuf,
        /// JSON configuration overriding the stock letterhead.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the page count and title of a PDF.
    Inspect {
        /// The PDF to inspect.
        pdf: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(cli.command) {
        eprintln!("Error: {}", err);
        print_error_sources(&err);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), LetterError> {
    match command {
        Commands::Generate {
            content,
            output,
            config,
        } => {
            let content = LetterContent::from_path(&content)?;
            generate(&output, &content, config)
        }
        Commands::Sample { output, config } => {
            let content = sample::sample_letter(sample::today());
            generate(&output, &content, config)
        }
        Commands::Inspect { pdf } => {
            let summary = inspect::summarize_file(&pdf)?;
            println!("{}: {} page(s)", pdf.display(), summary.pages);
            if let Some(title) = summary.title {
                println!("title: {}", title);
            }
            Ok(())
        }
    }
}

fn generate(
    output: &Path,
    content: &LetterContent,
    config: Option<PathBuf>,
) -> Result<(), LetterError> {
    let config = match config {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            LetterConfig::from_path(path)?
        }
        None => LetterConfig::default(),
    };
    let report = generate_document(output, content, &config).into_result()?;
    println!("{} ({} page(s))", report.path.display(), report.pages);
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
