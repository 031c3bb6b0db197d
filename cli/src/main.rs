//! bankstmt CLI - bank statement transaction extraction tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use bankstmt::{
    render, summarize, ErrorMode, ExtractConfig, ExtractionResult, JsonFormat, PageSelection,
    ParseOptions, Pipeline, StatementParser,
};

#[derive(Parser)]
#[command(name = "bankstmt")]
#[command(version)]
#[command(about = "Extract transactions from bank statement PDFs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract transactions
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Engine configuration (JSON)
        #[arg(long, value_name = "FILE", env = "BANKSTMT_CONFIG")]
        config: Option<PathBuf>,

        /// Skip pages whose content cannot be decoded
        #[arg(long)]
        lenient: bool,
    },

    /// Show the reconstructed table of each page
    Table {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Only this page
        #[arg(long)]
        page: Option<u32>,
    },

    /// Show totals per designation
    Summary {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Engine configuration (JSON)
        #[arg(long, value_name = "FILE", env = "BANKSTMT_CONFIG")]
        config: Option<PathBuf>,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Report candidates dropped by the validator
    Validate {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Engine configuration (JSON)
        #[arg(long, value_name = "FILE", env = "BANKSTMT_CONFIG")]
        config: Option<PathBuf>,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// JSON array of records
    Json,
    /// Aligned text table
    Text,
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            format,
            compact,
            pages,
            config,
            lenient,
        } => cmd_extract(
            &input,
            output.as_deref(),
            format,
            compact,
            pages.as_deref(),
            config.as_deref(),
            lenient,
        ),
        Commands::Table { input, page } => cmd_table(&input, page),
        Commands::Summary {
            input,
            config,
            json,
        } => cmd_summary(&input, config.as_deref(), json),
        Commands::Validate {
            input,
            config,
            json,
        } => cmd_validate(&input, config.as_deref(), json),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<ExtractConfig, bankstmt::Error> {
    match path {
        Some(path) => {
            log::debug!("Loading configuration from {}", path.display());
            ExtractConfig::from_json_file(path)
        }
        None => Ok(ExtractConfig::default()),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Decode the statement and run the pipeline behind a spinner.
fn run(
    input: &Path,
    options: ParseOptions,
    config: &ExtractConfig,
) -> Result<ExtractionResult, bankstmt::Error> {
    let pipeline = Pipeline::new(config)?;

    let pb = spinner("Reading statement...");
    let parser = match StatementParser::open_with_options(input, options) {
        Ok(parser) => parser,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.set_message(format!("Extracting {} pages...", parser.page_count()));
    let result = parser.extract(&pipeline);
    pb.finish_and_clear();
    result
}

fn write_output(output: Option<&Path>, content: &str) -> CliResult {
    if let Some(path) = output {
        fs::write(path, content)?;
        eprintln!("{} {}", "Saved to".green(), path.display());
    } else {
        print!("{}", content);
        if !content.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    format: OutputFormat,
    compact: bool,
    pages: Option<&str>,
    config: Option<&Path>,
    lenient: bool,
) -> CliResult {
    let page_selection = match pages {
        Some(p) => PageSelection::parse(p)?,
        None => PageSelection::All,
    };
    log::debug!("Reading pages: {}", page_selection);
    let error_mode = if lenient {
        ErrorMode::Lenient
    } else {
        ErrorMode::Strict
    };
    let options = ParseOptions::new()
        .with_pages(page_selection)
        .with_error_mode(error_mode);

    let config = load_config(config)?;
    let result = run(input, options, &config)?;

    let content = match format {
        OutputFormat::Json => {
            let json_format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            render::to_json(&result.records, json_format)?
        }
        OutputFormat::Text => render::to_text(&result.records),
    };
    write_output(output, &content)?;

    eprintln!(
        "{} {} transactions from {} pages ({} candidates rejected)",
        "Extracted".green().bold(),
        result.len(),
        result.pages.len(),
        result.rejected.len()
    );
    for page in result.pages.iter().filter(|p| p.tier.is_none()) {
        log::debug!("Page {} produced no transactions", page.page);
    }
    Ok(())
}

fn cmd_table(input: &Path, page: Option<u32>) -> CliResult {
    let parser = StatementParser::open(input)?;
    let pages = match page {
        Some(page) => vec![page],
        None => parser.selected_pages(),
    };

    for page in pages {
        let fragments = parser.page_fragments(page)?;
        let table = bankstmt::analyze_page(page, &fragments);
        println!("{}", render::table_to_text(&table));
    }
    Ok(())
}

fn cmd_summary(input: &Path, config: Option<&Path>, json: bool) -> CliResult {
    let config = load_config(config)?;
    let result = run(input, ParseOptions::default(), &config)?;
    let summaries = summarize(&result.records);

    if json {
        println!("{}", render::to_json(&summaries, JsonFormat::Pretty)?);
    } else {
        print!("{}", render::summary_to_text(&summaries));
    }
    Ok(())
}

fn cmd_validate(input: &Path, config: Option<&Path>, json: bool) -> CliResult {
    let config = load_config(config)?;
    let result = run(input, ParseOptions::default(), &config)?;
    let report = result.validation_report();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Validation Report".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Accepted".bold(), result.len());
    println!("{}: {}", "Rejected".bold(), report.errors.len());
    println!();

    if report.is_valid {
        println!("{}", "No candidates were rejected.".green());
    } else {
        for error in &report.errors {
            println!("  {} {}", "✗".red(), error);
        }
    }
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "bankstmt".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Bank statement transaction extraction tool");
    println!();
    println!("License: MIT");
}
