//! Which pages of a statement to read, and what to do with unreadable ones.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Options for reading a statement PDF.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Undecodable pages abort the read, or are skipped
    pub error_mode: ErrorMode,
    /// 1-based pages handed to the pipeline
    pub pages: PageSelection,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Skip pages whose content stream cannot be decoded.
    pub fn lenient(self) -> Self {
        self.with_error_mode(ErrorMode::Lenient)
    }

    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

/// Reaction to a page whose content cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// The whole statement fails; no partial records
    #[default]
    Strict,
    /// The page is logged and yields no records
    Lenient,
}

/// Pages to read (1-based).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    #[default]
    All,
    Range(RangeInclusive<u32>),
    /// Sorted, without duplicates when built by [`PageSelection::parse`]
    Pages(Vec<u32>),
}

impl PageSelection {
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse `"all"`, `"2-4"` or a comma list such as `"1,3,5-7"`.
    ///
    /// A lone range stays a [`PageSelection::Range`]; anything with a
    /// comma is expanded into a page list.
    pub fn parse(s: &str) -> Result<Self> {
        let input = s.trim();
        if input.is_empty() || input.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }
        let invalid = || Error::InvalidPageRange(input.to_string());

        let mut pages = Vec::new();
        for part in input.split(',') {
            let span = parse_span(part).ok_or_else(invalid)?;
            if !input.contains(',') && span.start() != span.end() {
                return Ok(PageSelection::Range(span));
            }
            pages.extend(span);
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}

/// `"n"` or `"a-b"` with `1 <= a <= b`.
fn parse_span(part: &str) -> Option<RangeInclusive<u32>> {
    let page = |text: &str| text.trim().parse::<u32>().ok().filter(|p| *p >= 1);
    match part.split_once('-') {
        Some((start, end)) => {
            let (start, end) = (page(start)?, page(end)?);
            (start <= end).then_some(start..=end)
        }
        None => page(part).map(|p| p..=p),
    }
}

impl FromStr for PageSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for PageSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSelection::All => f.write_str("all"),
            PageSelection::Range(range) => write!(f, "{}-{}", range.start(), range.end()),
            PageSelection::Pages(pages) => {
                let list: Vec<String> = pages.iter().map(u32::to_string).collect();
                f.write_str(&list.join(","))
            }
        }
    }
}
