//! # bankstmt
//!
//! Transaction extraction from generated bank-statement PDFs.
//!
//! Statements from different providers lay their tables out differently:
//! columns drift, headers go missing, amounts come in several number
//! formats and debits share a column with credits. This library rebuilds
//! each page's row/column structure from positioned text fragments and runs
//! a cascade of extraction strategies over it, keeping only transactions
//! whose designation is on a configured target list.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bankstmt::{extract_file, render};
//!
//! fn main() -> bankstmt::Result<()> {
//!     let records = extract_file("statement.pdf")?;
//!     println!("{}", render::to_text(&records));
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Table reconstruction**: adaptive row and column tolerances per page
//! - **Column roles**: debit/credit from headers, content or position
//! - **Fallback tiers**: column structure, row patterns, free text
//! - **Validation**: implausible amounts, dates and labels are dropped
//! - **Tracing**: structured decision events through [`trace::TraceSink`]

pub mod amount;
pub mod config;
pub mod designation;
pub mod error;
pub mod extract;
pub mod model;
pub mod parser;
pub mod render;
pub mod summary;
pub mod table;
pub mod trace;
pub mod validate;

// Re-export commonly used types
pub use config::{ExtractConfig, ValidationLimits};
pub use designation::{DesignationMatcher, DesignationSet};
pub use error::{Error, Result};
pub use extract::{ExtractionResult, PageOutcome, Pipeline, Strategy};
pub use model::{Cell, ColumnBand, ColumnRole, Row, TextFragment, Tier, TransactionRecord};
pub use parser::{ErrorMode, PageSelection, ParseOptions, StatementParser};
pub use render::JsonFormat;
pub use summary::{summarize, DesignationSummary};
pub use table::{analyze_page, PageTable};
pub use trace::{CollectingTrace, TraceEvent, TraceSink};
pub use validate::{RecordValidator, ValidationReport};

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Extract transactions from a statement PDF file with the default targets.
///
/// # Example
///
/// ```no_run
/// use bankstmt::extract_file;
///
/// let records = extract_file("statement.pdf").unwrap();
/// println!("Transactions: {}", records.len());
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<Vec<TransactionRecord>> {
    extract_file_with_config(path, &ExtractConfig::default())
}

/// Extract transactions from a file with a custom configuration.
///
/// # Example
///
/// ```no_run
/// use bankstmt::{extract_file_with_config, ExtractConfig};
///
/// let config = ExtractConfig::new().with_designations(["ICCN", "TRSF"]);
/// let records = extract_file_with_config("statement.pdf", &config).unwrap();
/// ```
pub fn extract_file_with_config<P: AsRef<Path>>(
    path: P,
    config: &ExtractConfig,
) -> Result<Vec<TransactionRecord>> {
    let pipeline = Pipeline::new(config)?;
    let parser = StatementParser::open(path)?;
    Ok(parser.extract(&pipeline)?.into_records())
}

/// Extract transactions from an in-memory PDF.
///
/// # Example
///
/// ```no_run
/// use bankstmt::extract_bytes;
///
/// let data = std::fs::read("statement.pdf").unwrap();
/// let records = extract_bytes(&data).unwrap();
/// ```
pub fn extract_bytes(data: &[u8]) -> Result<Vec<TransactionRecord>> {
    extract_bytes_with_config(data, &ExtractConfig::default())
}

/// Extract transactions from an in-memory PDF with a custom configuration.
pub fn extract_bytes_with_config(
    data: &[u8],
    config: &ExtractConfig,
) -> Result<Vec<TransactionRecord>> {
    let pipeline = Pipeline::new(config)?;
    let parser = StatementParser::from_bytes(data)?;
    Ok(parser.extract(&pipeline)?.into_records())
}

/// Extract transactions from a reader.
pub fn extract_reader<R: Read>(reader: R) -> Result<Vec<TransactionRecord>> {
    extract_reader_with_config(reader, &ExtractConfig::default())
}

/// Extract transactions from a reader with a custom configuration.
pub fn extract_reader_with_config<R: Read>(
    reader: R,
    config: &ExtractConfig,
) -> Result<Vec<TransactionRecord>> {
    let pipeline = Pipeline::new(config)?;
    let parser = StatementParser::from_reader(reader)?;
    Ok(parser.extract(&pipeline)?.into_records())
}

/// Extract transactions from a file without blocking the async runtime.
///
/// The file is read with `tokio::fs`; decoding and extraction run on the
/// blocking pool.
#[cfg(feature = "async")]
pub async fn extract_file_async<P: AsRef<Path>>(
    path: P,
    config: ExtractConfig,
) -> Result<Vec<TransactionRecord>> {
    let data = tokio::fs::read(path).await?;
    extract_bytes_async(data, config).await
}

/// Extract transactions from owned PDF bytes on the blocking pool.
#[cfg(feature = "async")]
pub async fn extract_bytes_async(
    data: Vec<u8>,
    config: ExtractConfig,
) -> Result<Vec<TransactionRecord>> {
    tokio::task::spawn_blocking(move || extract_bytes_with_config(&data, &config))
        .await
        .map_err(|e| Error::Other(format!("extraction task failed: {}", e)))?
}

/// Builder for configuring and running an extraction.
///
/// # Example
///
/// ```no_run
/// use bankstmt::{Extractor, PageSelection};
///
/// let result = Extractor::new()
///     .with_designations(["PMT TOURISME", "ICCN"])
///     .with_pages(PageSelection::Range(1..=3))
///     .lenient()
///     .extract_file("statement.pdf")?;
/// println!("{} records, {} rejected", result.len(), result.rejected.len());
/// # Ok::<(), bankstmt::Error>(())
/// ```
#[derive(Default)]
pub struct Extractor {
    config: ExtractConfig,
    parse_options: ParseOptions,
    trace: Option<Arc<dyn TraceSink + Send + Sync>>,
}

impl Extractor {
    /// Create a new extractor with default targets and strict parsing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole engine configuration.
    pub fn with_config(mut self, config: ExtractConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the target designation labels.
    pub fn with_designations<S: AsRef<str>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.config = self.config.with_designations(labels);
        self
    }

    /// Enable lenient parsing mode.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.parse_options = self.parse_options.with_pages(pages);
        self
    }

    /// Send pipeline decisions to a trace sink.
    pub fn with_trace(mut self, sink: Arc<dyn TraceSink + Send + Sync>) -> Self {
        self.trace = Some(sink);
        self
    }

    /// Build the pipeline this extractor would run.
    pub fn pipeline(&self) -> Result<Pipeline> {
        let pipeline = Pipeline::new(&self.config)?;
        Ok(match &self.trace {
            Some(sink) => pipeline.with_trace(Arc::clone(sink)),
            None => pipeline,
        })
    }

    /// Extract from a PDF file.
    pub fn extract_file<P: AsRef<Path>>(&self, path: P) -> Result<ExtractionResult> {
        let pipeline = self.pipeline()?;
        StatementParser::open_with_options(path, self.parse_options.clone())?.extract(&pipeline)
    }

    /// Extract from PDF bytes.
    pub fn extract_bytes(&self, data: &[u8]) -> Result<ExtractionResult> {
        let pipeline = self.pipeline()?;
        StatementParser::from_bytes_with_options(data, self.parse_options.clone())?
            .extract(&pipeline)
    }

    /// Extract from pre-positioned fragments, one entry per page.
    pub fn extract_pages<I, F>(&self, pages: I) -> Result<ExtractionResult>
    where
        I: IntoIterator<Item = (u32, F)>,
        F: AsRef<[TextFragment]>,
    {
        Ok(self.pipeline()?.extract_pages(pages))
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("config", &self.config)
            .field("parse_options", &self.parse_options)
            .field("trace", &self.trace.is_some())
            .finish()
    }
}
