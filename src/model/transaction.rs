//! Transaction records produced by the extraction pipeline.

use std::fmt;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `d-m-yyyy` or `d/m/yyyy`, one or two digit day and month.
pub(crate) const DATE_PATTERN: &str = r"\d{1,2}[-/]\d{1,2}[-/]\d{4}";

static DATE_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(DATE_PATTERN).expect("valid date regex"));

/// The extraction strategy that produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Cells read through detected debit/credit column roles
    ColumnStructure,
    /// Per-row regular expression over the row's raw text
    RowPattern,
    /// Regular expression over the whole page text, ignoring rows
    FreeText,
}

impl Tier {
    /// Short identifier used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::ColumnStructure => "column",
            Tier::RowPattern => "row-pattern",
            Tier::FreeText => "free-text",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One extracted transaction.
///
/// `debit` and `credit` are non-negative magnitudes and `amount` is always
/// `credit - debit`. The fields are only reachable through accessors so the
/// sign invariant cannot be broken after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    date: String,
    designation: String,
    debit: Decimal,
    credit: Decimal,
    amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    tier: Option<Tier>,
    #[serde(skip_serializing_if = "is_zero")]
    page: u32,
}

fn is_zero(page: &u32) -> bool {
    *page == 0
}

impl TransactionRecord {
    /// Create a record; negative inputs are taken by magnitude.
    pub fn new(
        date: impl Into<String>,
        designation: impl Into<String>,
        debit: Decimal,
        credit: Decimal,
    ) -> Self {
        let debit = debit.abs();
        let credit = credit.abs();
        Self {
            date: date.into(),
            designation: designation.into(),
            debit,
            credit,
            amount: credit - debit,
            tier: None,
            page: 0,
        }
    }

    /// Create a debit-only record.
    pub fn debit(date: impl Into<String>, designation: impl Into<String>, value: Decimal) -> Self {
        Self::new(date, designation, value, Decimal::ZERO)
    }

    /// Create a credit-only record.
    pub fn credit(date: impl Into<String>, designation: impl Into<String>, value: Decimal) -> Self {
        Self::new(date, designation, Decimal::ZERO, value)
    }

    /// Attach the page and strategy that produced the record.
    pub fn with_origin(mut self, page: u32, tier: Tier) -> Self {
        self.page = page;
        self.tier = Some(tier);
        self
    }

    /// Raw date text as it appeared on the statement.
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Matched designation label.
    pub fn designation(&self) -> &str {
        &self.designation
    }

    /// Outflow magnitude.
    pub fn debit_amount(&self) -> Decimal {
        self.debit
    }

    /// Inflow magnitude.
    pub fn credit_amount(&self) -> Decimal {
        self.credit
    }

    /// Signed net amount (`credit - debit`).
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// `|debit| + |credit|`.
    pub fn magnitude(&self) -> Decimal {
        self.debit + self.credit
    }

    /// Strategy that produced the record, if known.
    pub fn tier(&self) -> Option<Tier> {
        self.tier
    }

    /// 1-based page number, 0 when unknown.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Compare date, designation and amounts, ignoring where the record
    /// came from.
    pub fn same_transaction(&self, other: &TransactionRecord) -> bool {
        self.date == other.date
            && self.designation == other.designation
            && self.debit == other.debit
            && self.credit == other.credit
    }

    /// Check if the record is credit-dominant.
    pub fn is_credit(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Parse the raw date as day-month-year.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_statement_date(&self.date)
    }
}

/// Find the first date-shaped substring.
pub fn find_date(text: &str) -> Option<&str> {
    DATE_SHAPE.find(text).map(|m| m.as_str())
}

/// Check if text contains a date-shaped substring.
pub fn is_date_shaped(text: &str) -> bool {
    DATE_SHAPE.is_match(text)
}

/// Parse a `dd-mm-yyyy` or `dd/mm/yyyy` statement date.
pub fn parse_statement_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    ["%d-%m-%Y", "%d/%m/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_amount_is_credit_minus_debit() {
        let rec = TransactionRecord::new(
            "01-03-2024",
            "ICCN",
            Decimal::new(25000, 2),
            Decimal::new(10000, 2),
        );
        assert_eq!(rec.amount(), Decimal::new(-15000, 2));
        assert_eq!(rec.magnitude(), Decimal::new(35000, 2));
    }

    #[test]
    fn test_debit_only_is_negative() {
        let rec = TransactionRecord::debit("01-03-2024", "PMT TOURISME", Decimal::new(123456, 2));
        assert_eq!(rec.amount(), Decimal::new(-123456, 2));
        assert!(!rec.is_credit());
    }

    #[test]
    fn test_negative_input_taken_by_magnitude() {
        let rec = TransactionRecord::credit("01-03-2024", "ICCN", Decimal::new(-500, 0));
        assert_eq!(rec.credit_amount(), Decimal::new(500, 0));
        assert_eq!(rec.amount(), Decimal::new(500, 0));
    }

    #[test]
    fn test_origin_and_serialization() {
        let rec = TransactionRecord::debit("02/03/2024", "TRSF", Decimal::new(1050, 2))
            .with_origin(2, Tier::RowPattern);
        assert_eq!(rec.page(), 2);
        assert_eq!(rec.tier(), Some(Tier::RowPattern));

        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"tier\":\"row_pattern\""));
        assert!(json.contains("\"amount\":-10.5"));

        let bare = TransactionRecord::debit("02/03/2024", "TRSF", Decimal::ONE);
        let json = serde_json::to_string(&bare).unwrap();
        assert!(!json.contains("tier"));
        assert!(!json.contains("page"));
    }

    #[test]
    fn test_same_transaction_ignores_origin() {
        let a = TransactionRecord::debit("01-03-2024", "ICCN", Decimal::ONE).with_origin(1, Tier::FreeText);
        let b = TransactionRecord::debit("01-03-2024", "ICCN", Decimal::ONE).with_origin(2, Tier::RowPattern);
        assert!(a.same_transaction(&b));
        assert_ne!(a, b);
        assert!(!a.same_transaction(&TransactionRecord::credit("01-03-2024", "ICCN", Decimal::ONE)));
    }

    #[test]
    fn test_parsed_date() {
        let rec = TransactionRecord::debit("15/01/2024", "ICCN", Decimal::ONE);
        let date = rec.parsed_date().unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2024, 1, 15));

        assert!(parse_statement_date("31-02-2024").is_none());
        assert!(parse_statement_date("not a date").is_none());
    }

    #[test]
    fn test_date_shape() {
        assert_eq!(find_date("Op. du 1/3/2024 ICCN"), Some("1/3/2024"));
        assert_eq!(find_date("le 15-01-2024"), Some("15-01-2024"));
        assert!(is_date_shaped("02/03/2024"));
        assert!(!is_date_shaped("2024-03-02"));
        assert!(!is_date_shaped("1,234.56"));
    }
}
