//! Transaction extraction: an ordered cascade of strategies.
//!
//! Each page is reconstructed into a [`PageTable`] and handed to the
//! strategies in order. A strategy's candidates are validated before the
//! cascade decides anything: the first strategy whose validated output is
//! non-empty wins the page, and later strategies are not consulted.
//!
//! # Example
//!
//! ```no_run
//! use bankstmt::{ExtractConfig, Pipeline, TextFragment};
//!
//! let pipeline = Pipeline::new(&ExtractConfig::default())?;
//! let fragments = vec![
//!     TextFragment::new("01-03-2024", 40.0, 700.0),
//!     TextFragment::new("PMT TOURISME", 120.0, 700.0),
//!     TextFragment::new("1,234.56", 300.0, 700.0),
//! ];
//! let result = pipeline.extract_fragments(&fragments);
//! for record in &result.records {
//!     println!("{} {} {}", record.date(), record.designation(), record.amount());
//! }
//! # Ok::<(), bankstmt::Error>(())
//! ```

mod column;
mod free_text;
mod row_pattern;

use std::sync::Arc;

use serde::Serialize;

pub use column::ColumnStrategy;
pub use free_text::FreeTextStrategy;
pub use row_pattern::RowPatternStrategy;

use crate::config::ExtractConfig;
use crate::designation::DesignationMatcher;
use crate::error::Result;
use crate::model::{TextFragment, Tier, TransactionRecord};
use crate::table::{analyze_page, PageTable};
use crate::trace::{TraceEvent, TraceSink, Tracer};
use crate::validate::{RecordValidator, Rejection, ValidationReport};

/// Shared state handed to every strategy attempt.
pub struct StrategyContext<'a> {
    pub matcher: &'a DesignationMatcher,
    pub tracer: &'a Tracer,
}

/// One extraction tier.
pub trait Strategy: Send + Sync {
    /// The tier this strategy implements.
    fn tier(&self) -> Tier;

    /// Produce candidate records for a page; they are validated afterwards.
    fn attempt(&self, table: &PageTable, ctx: &StrategyContext<'_>) -> Vec<TransactionRecord>;
}

/// Per-page summary of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageOutcome {
    /// 1-based page number
    pub page: u32,
    /// Winning tier, `None` when no tier produced a valid record
    pub tier: Option<Tier>,
    /// Number of records the page contributed
    pub records: usize,
}

/// Records and rejections of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageExtraction {
    pub page: u32,
    pub tier: Option<Tier>,
    pub records: Vec<TransactionRecord>,
    pub rejected: Vec<Rejection>,
}

/// Result of extracting a whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionResult {
    /// Accepted records in page order
    pub records: Vec<TransactionRecord>,
    /// One outcome per processed page
    pub pages: Vec<PageOutcome>,
    /// Every candidate the validator dropped
    pub rejected: Vec<Rejection>,
}

impl ExtractionResult {
    /// Append one page's extraction.
    pub fn push(&mut self, page: PageExtraction) {
        self.pages.push(PageOutcome {
            page: page.page,
            tier: page.tier,
            records: page.records.len(),
        });
        self.records.extend(page.records);
        self.rejected.extend(page.rejected);
    }

    /// Number of accepted records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no record was accepted.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Validation report over the rejected candidates.
    pub fn validation_report(&self) -> ValidationReport {
        ValidationReport::from_rejections(&self.rejected)
    }

    /// Consume the result, keeping only the records.
    pub fn into_records(self) -> Vec<TransactionRecord> {
        self.records
    }
}

/// The extraction engine.
pub struct Pipeline {
    matcher: DesignationMatcher,
    validator: RecordValidator,
    strategies: Vec<Box<dyn Strategy>>,
    tracer: Tracer,
}

impl Pipeline {
    /// Build a pipeline with the three standard tiers.
    pub fn new(config: &ExtractConfig) -> Result<Self> {
        config.check()?;
        let strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(ColumnStrategy::new()),
            Box::new(RowPatternStrategy::new()),
            Box::new(FreeTextStrategy::new(&config.designations)?),
        ];
        Ok(Self {
            matcher: config.matcher(),
            validator: RecordValidator::new(config.limits.clone()),
            strategies,
            tracer: Tracer::disabled(),
        })
    }

    /// Attach a trace sink.
    pub fn with_trace(mut self, sink: Arc<dyn TraceSink + Send + Sync>) -> Self {
        self.tracer = Tracer::new(sink);
        self
    }

    /// Replace the strategy cascade.
    pub fn with_strategies(mut self, strategies: Vec<Box<dyn Strategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Tiers in cascade order.
    pub fn tiers(&self) -> Vec<Tier> {
        self.strategies.iter().map(|s| s.tier()).collect()
    }

    pub fn matcher(&self) -> &DesignationMatcher {
        &self.matcher
    }

    pub fn validator(&self) -> &RecordValidator {
        &self.validator
    }

    /// Reconstruct a page's table, reporting geometry decisions.
    pub fn analyze(&self, page: u32, fragments: &[TextFragment]) -> PageTable {
        self.tracer.emit(|| TraceEvent::PageStarted {
            page,
            fragments: fragments.len(),
        });

        let table = analyze_page(page, fragments);

        self.tracer.emit(|| TraceEvent::RowsGrouped {
            page,
            rows: table.rows.len(),
            tolerance: table.row_tolerance,
        });
        self.tracer.emit(|| TraceEvent::ColumnsDetected {
            page,
            columns: table.column_count(),
            tolerance: table.column_tolerance,
        });
        self.tracer.emit(|| TraceEvent::HeaderDetected {
            page,
            row: table.header,
        });
        self.tracer.emit(|| TraceEvent::RolesDetected {
            page,
            roles: table.roles,
        });

        table
    }

    /// Run the cascade over an already reconstructed table.
    pub fn extract_table(&self, table: &PageTable) -> PageExtraction {
        let page = table.page;
        let ctx = StrategyContext {
            matcher: &self.matcher,
            tracer: &self.tracer,
        };
        let mut extraction = PageExtraction {
            page,
            ..PageExtraction::default()
        };

        for strategy in &self.strategies {
            let tier = strategy.tier();
            let candidates: Vec<TransactionRecord> = strategy
                .attempt(table, &ctx)
                .into_iter()
                .map(|r| r.with_origin(page, tier))
                .collect();
            let candidate_count = candidates.len();
            let (accepted, rejected) = self.validator.partition(candidates);

            for rejection in rejected {
                self.tracer.emit(|| TraceEvent::RecordRejected {
                    page,
                    tier,
                    record: rejection.record.clone(),
                    reason: rejection.reason,
                });
                let seen = extraction.rejected.iter().any(|r| {
                    r.reason == rejection.reason && r.record.same_transaction(&rejection.record)
                });
                if !seen {
                    extraction.rejected.push(rejection);
                }
            }

            self.tracer.emit(|| TraceEvent::TierFinished {
                page,
                tier,
                candidates: candidate_count,
                accepted: accepted.len(),
            });
            log::debug!(
                "Pipeline: page {} tier {} -> {} candidates, {} accepted",
                page,
                tier,
                candidate_count,
                accepted.len()
            );

            if !accepted.is_empty() {
                for record in &accepted {
                    self.tracer.emit(|| TraceEvent::RecordEmitted {
                        page,
                        tier,
                        record: record.clone(),
                    });
                }
                extraction.tier = Some(tier);
                extraction.records = accepted;
                break;
            }
        }

        self.tracer.emit(|| TraceEvent::PageFinished {
            page,
            tier: extraction.tier,
            records: extraction.records.len(),
        });

        extraction
    }

    /// Reconstruct and extract one page.
    pub fn extract_page(&self, page: u32, fragments: &[TextFragment]) -> PageExtraction {
        let table = self.analyze(page, fragments);
        self.extract_table(&table)
    }

    /// Extract a sequence of `(page number, fragments)` in order.
    pub fn extract_pages<I, F>(&self, pages: I) -> ExtractionResult
    where
        I: IntoIterator<Item = (u32, F)>,
        F: AsRef<[TextFragment]>,
    {
        let mut result = ExtractionResult::default();
        for (page, fragments) in pages {
            result.push(self.extract_page(page, fragments.as_ref()));
        }
        result
    }

    /// Extract a single page's fragments as page 1.
    pub fn extract_fragments(&self, fragments: &[TextFragment]) -> ExtractionResult {
        self.extract_pages([(1, fragments)])
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("tiers", &self.tiers())
            .field("designations", &self.matcher.designations().len())
            .field("tracer", &self.tracer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;
    use crate::trace::CollectingTrace;
    use crate::validate::RejectReason;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(&ExtractConfig::default()).unwrap()
    }

    fn table(rows: &[&[&str]]) -> PageTable {
        PageTable::from_rows(
            1,
            rows.iter()
                .map(|cells| Row::from_texts(0.0, cells.iter().copied()))
                .collect(),
        )
    }

    #[test]
    fn test_clean_five_column_row() {
        let page = table(&[&["01-03-2024", "01-03-2024", "PMT TOURISME payment", "1,234.56", ""]]);
        let out = pipeline().extract_table(&page);

        assert_eq!(out.tier, Some(Tier::ColumnStructure));
        assert_eq!(out.records.len(), 1);
        let record = &out.records[0];
        assert_eq!(record.date(), "01-03-2024");
        assert_eq!(record.designation(), "PMT TOURISME");
        assert_eq!(record.debit_amount(), dec("1234.56"));
        assert_eq!(record.credit_amount(), Decimal::ZERO);
        assert_eq!(record.amount(), dec("-1234.56"));
    }

    #[test]
    fn test_single_amount_column_credit() {
        let page = table(&[&["01-03-2024", "Versement ICCN", "500.00"]]);
        assert!(page.roles.is_ambiguous());
        let out = pipeline().extract_table(&page);

        assert_eq!(out.records.len(), 1);
        let record = &out.records[0];
        assert_eq!(record.designation(), "ICCN");
        assert_eq!(record.debit_amount(), Decimal::ZERO);
        assert_eq!(record.credit_amount(), dec("500.00"));
        assert_eq!(record.amount(), dec("500.00"));
    }

    #[test]
    fn test_unknown_designation_emits_nothing() {
        let page = table(&[&["01-03-2024", "FRAIS DIVERS", "75.00"]]);
        let out = pipeline().extract_table(&page);
        assert!(out.records.is_empty());
        assert_eq!(out.tier, None);
        assert!(out.rejected.is_empty());
    }

    #[test]
    fn test_malformed_amount_rejected() {
        let page = table(&[&["01-03-2024", "PMT TOURISME REF 12", "N/A"]]);
        let out = pipeline().extract_table(&page);
        assert!(out.records.is_empty());
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].reason, RejectReason::MagnitudeTooSmall);
    }

    #[test]
    fn test_implausible_magnitude_rejected() {
        let page = table(&[&["01-03-2024", "PMT TOURISME", "50,000,000.00"]]);
        let out = pipeline().extract_table(&page);
        assert!(out.records.is_empty());
        // The same transaction rejected by several tiers is reported once.
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].reason, RejectReason::MagnitudeTooLarge);
    }

    #[test]
    fn test_falls_through_to_row_pattern() {
        // Two-column table: no roles, so the column tier produces nothing.
        let page = table(&[&["01-03-2024 ICCN", "250.00"]]);
        assert!(!page.roles.is_known());
        let out = pipeline().extract_table(&page);
        assert_eq!(out.tier, Some(Tier::RowPattern));
        assert_eq!(out.records[0].debit_amount(), dec("250.00"));
        assert_eq!(out.records[0].tier(), Some(Tier::RowPattern));
    }

    #[test]
    fn test_stops_at_first_successful_tier() {
        let trace = Arc::new(CollectingTrace::new());
        let pipeline = pipeline().with_trace(trace.clone());
        let page = table(&[&["01-03-2024", "Versement ICCN", "500.00"]]);
        pipeline.extract_table(&page);

        let finished: Vec<Tier> = trace
            .events()
            .iter()
            .filter_map(|e| match e {
                TraceEvent::TierFinished { tier, .. } => Some(*tier),
                _ => None,
            })
            .collect();
        assert_eq!(finished, [Tier::ColumnStructure]);
    }

    #[test]
    fn test_custom_strategies() {
        struct Fixed;
        impl Strategy for Fixed {
            fn tier(&self) -> Tier {
                Tier::FreeText
            }
            fn attempt(&self, _: &PageTable, _: &StrategyContext<'_>) -> Vec<TransactionRecord> {
                vec![TransactionRecord::credit("05-03-2024", "TRSF", Decimal::TEN)]
            }
        }

        let pipeline = pipeline().with_strategies(vec![Box::new(Fixed)]);
        assert_eq!(pipeline.tiers(), [Tier::FreeText]);
        let out = pipeline.extract_table(&table(&[&["x"]]));
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].page(), 1);
        assert_eq!(out.records[0].tier(), Some(Tier::FreeText));
    }

    #[test]
    fn test_extract_pages_concatenates_in_order() {
        let page = |date: &str, y: f32| {
            vec![
                TextFragment::new(date, 40.0, y),
                TextFragment::new("PMT TOURISME", 120.0, y),
                TextFragment::new("100.00", 300.0, y),
                TextFragment::new(date, 40.0, y - 20.0),
                TextFragment::new("Paiement ICCN", 120.0, y - 20.0),
                TextFragment::new("200.00", 300.0, y - 20.0),
            ]
        };
        let result = pipeline().extract_pages(vec![
            (1, page("01-03-2024", 700.0)),
            (2, Vec::new()),
            (3, page("09-03-2024", 650.0)),
        ]);

        assert_eq!(result.pages.len(), 3);
        assert_eq!(result.pages[1].tier, None);
        assert_eq!(result.pages[1].records, 0);
        let dates: Vec<&str> = result.records.iter().map(|r| r.date()).collect();
        assert_eq!(dates, ["01-03-2024", "01-03-2024", "09-03-2024", "09-03-2024"]);
        let pages: Vec<u32> = result.records.iter().map(|r| r.page()).collect();
        assert_eq!(pages, [1, 1, 3, 3]);
        assert!(result.validation_report().is_valid);
    }

    #[test]
    fn test_sign_convention_holds_for_all_tiers() {
        let page = table(&[
            &["01-03-2024", "PMT TOURISME", "10.00", "3.00"],
            &["02-03-2024", "ICCN", "", "7.00"],
        ]);
        let out = pipeline().extract_table(&page);
        assert!(!out.records.is_empty());
        for record in &out.records {
            assert_eq!(record.amount(), record.credit_amount() - record.debit_amount());
            assert!(record.debit_amount() >= Decimal::ZERO);
            assert!(record.credit_amount() >= Decimal::ZERO);
        }
    }
}
