//! Free-text tier: regular expressions over the page's raw text.
//!
//! Used when the geometry is too broken for row-based extraction, e.g. when
//! a transaction's parts landed on different baselines. Two permutations
//! are tried: date before designation, and designation before date.

use once_cell::sync::Lazy;
use regex::{Match, Regex};

use super::{Strategy, StrategyContext};
use crate::amount::parse_amount;
use crate::designation::DesignationSet;
use crate::error::{Error, Result};
use crate::model::{find_date, Tier, TransactionRecord, DATE_PATTERN};
use crate::table::PageTable;

/// Amount capture; the trailing group stands in for "not followed by a digit".
const AMOUNT_PATTERN: &str = r"([\d,]{1,10}\.\d{2})(?:\D|$)";

static FILLER_AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d[\d,]*\.\d{2}").expect("valid amount regex"));

/// Extracts records from the page text with label-aware regexes.
#[derive(Debug, Clone)]
pub struct FreeTextStrategy {
    date_first: Regex,
    designation_first: Regex,
}

struct Hit<'t> {
    span: (usize, usize),
    text: &'t str,
    date: &'t str,
    designation: &'t str,
    amount: &'t str,
}

impl FreeTextStrategy {
    /// Compile the patterns for a designation set.
    pub fn new(designations: &DesignationSet) -> Result<Self> {
        if designations.is_empty() {
            return Err(Error::Config("designation list is empty".to_string()));
        }

        let labels = designations
            .iter()
            .map(|label| regex::escape(label).replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|");

        let compile = |pattern: String| {
            Regex::new(&pattern).map_err(|e| Error::Config(format!("designation pattern: {}", e)))
        };

        Ok(Self {
            date_first: compile(format!(
                r"(?i)({})\s+.*?({}).*?\s+{}",
                DATE_PATTERN, labels, AMOUNT_PATTERN
            ))?,
            designation_first: compile(format!(
                r"(?i)({}).*?({}).*?\s+{}",
                labels, DATE_PATTERN, AMOUNT_PATTERN
            ))?,
        })
    }

    fn hits<'t>(&self, text: &'t str) -> Vec<Hit<'t>> {
        // Capture groups: date-first is (date, label, amount), the other
        // permutation (label, date, amount).
        let mut hits = scan(&self.date_first, text, 1, 2);
        hits.extend(scan(&self.designation_first, text, 2, 1));
        hits.sort_by_key(|h| h.span);
        hits
    }
}

/// All hits of one permutation. A candidate whose filler text holds another
/// date or amount straddles two transactions; it is dropped and the search
/// resumes one character after its start.
fn scan<'t>(re: &Regex, text: &'t str, date_group: usize, label_group: usize) -> Vec<Hit<'t>> {
    let mut hits = Vec::new();
    let mut pos = 0;

    while pos <= text.len() {
        let Some(caps) = re.captures_at(text, pos) else {
            break;
        };
        let (Some(all), Some(date), Some(designation), Some(amount)) = (
            caps.get(0),
            caps.get(date_group),
            caps.get(label_group),
            caps.get(3),
        ) else {
            break;
        };

        let mut parts = [date, designation, amount];
        parts.sort_by_key(Match::start);
        let straddles = parts
            .windows(2)
            .any(|pair| is_transaction_boundary(&text[pair[0].end()..pair[1].start()]));

        if straddles {
            pos = all.start() + text[all.start()..].chars().next().map_or(1, char::len_utf8);
            continue;
        }

        hits.push(Hit {
            span: (all.start(), amount.end()),
            text: &text[all.start()..amount.end()],
            date: date.as_str(),
            designation: designation.as_str(),
            amount: amount.as_str(),
        });
        pos = amount.end();
    }

    hits
}

/// Check if filler text carries a date or an amount of its own.
fn is_transaction_boundary(filler: &str) -> bool {
    find_date(filler).is_some() || FILLER_AMOUNT.is_match(filler)
}

impl Strategy for FreeTextStrategy {
    fn tier(&self) -> Tier {
        Tier::FreeText
    }

    fn attempt(&self, table: &PageTable, ctx: &StrategyContext<'_>) -> Vec<TransactionRecord> {
        let mut records: Vec<TransactionRecord> = Vec::new();

        for hit in self.hits(&table.raw_text) {
            let Some(designation) = ctx.matcher.canonical(hit.designation) else {
                continue;
            };
            let value = parse_amount(hit.amount);
            let record = if ctx.matcher.is_likely_credit(hit.text) {
                TransactionRecord::credit(hit.date, designation, value)
            } else {
                TransactionRecord::debit(hit.date, designation, value)
            };

            if records.iter().any(|r| r.same_transaction(&record)) {
                log::debug!(
                    "FreeTextStrategy: duplicate {} {} dropped",
                    record.date(),
                    record.designation()
                );
                continue;
            }
            records.push(record);
        }

        records
    }
}
