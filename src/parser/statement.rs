//! Statement PDF reader: pages in, positioned fragments out.

use std::io::Read;
use std::path::Path;

use super::backend::{LopdfBackend, PdfBackend};
use super::fragments::interpret;
use super::options::{ErrorMode, ParseOptions};
use crate::error::{Error, Result};
use crate::extract::{ExtractionResult, Pipeline};
use crate::model::TextFragment;

/// Fragments of one page.
pub type PageFragments = (u32, Vec<TextFragment>);

/// Reads a statement PDF page by page.
pub struct StatementParser<B = LopdfBackend> {
    backend: B,
    options: ParseOptions,
}

impl StatementParser<LopdfBackend> {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        Ok(Self::with_backend(LopdfBackend::load_file(path)?, options))
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        Ok(Self::with_backend(LopdfBackend::load_bytes(data)?, options))
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse a PDF from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(reader: R, options: ParseOptions) -> Result<Self> {
        Ok(Self::with_backend(LopdfBackend::load_reader(reader)?, options))
    }

    /// PDF version from the document header.
    pub fn version(&self) -> String {
        self.backend.version()
    }
}

impl<B: PdfBackend> StatementParser<B> {
    /// Wrap an already loaded backend.
    pub fn with_backend(backend: B, options: ParseOptions) -> Self {
        Self { backend, options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.backend.pages().len() as u32
    }

    /// Page numbers selected by the options, in document order.
    pub fn selected_pages(&self) -> Vec<u32> {
        self.backend
            .pages()
            .into_keys()
            .filter(|p| self.options.pages.includes(*p))
            .collect()
    }

    /// Fragments of one page, regardless of the page selection.
    pub fn page_fragments(&self, page: u32) -> Result<Vec<TextFragment>> {
        let pages = self.backend.pages();
        let page_id = *pages
            .get(&page)
            .ok_or(Error::PageOutOfRange(page, pages.len() as u32))?;

        let ops = self
            .backend
            .page_operations(page_id)
            .map_err(|e| Error::TextExtract(format!("Page {}: {}", page, e)))?;

        let fragments = interpret(&ops, |font, bytes| {
            self.backend.decode_text(page_id, font, bytes)
        });
        log::debug!("StatementParser: page {} -> {} fragments", page, fragments.len());
        Ok(fragments)
    }

    /// Fragments of every selected page.
    ///
    /// In strict mode the first undecodable page aborts the whole read; in
    /// lenient mode it is logged and contributes no fragments.
    pub fn fragments(&self) -> Result<Vec<PageFragments>> {
        let mut pages = Vec::new();
        for page in self.selected_pages() {
            match self.page_fragments(page) {
                Ok(fragments) => pages.push((page, fragments)),
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Failed to extract text from page {}: {}", page, e);
                    pages.push((page, Vec::new()));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(pages)
    }

    /// Read every selected page and run the pipeline over them.
    ///
    /// All pages are decoded before extraction starts, so a decode failure
    /// never yields partial results.
    pub fn extract(&self, pipeline: &Pipeline) -> Result<ExtractionResult> {
        let pages = self.fragments()?;
        Ok(pipeline.extract_pages(pages))
    }
}

impl<B> std::fmt::Debug for StatementParser<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementParser")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
