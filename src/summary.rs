//! Per-designation totals.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::model::TransactionRecord;

/// Totals for one designation label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DesignationSummary {
    pub designation: String,
    pub count: usize,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    /// Sum of signed amounts (`total_credit - total_debit`)
    pub total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_date: Option<NaiveDate>,
}

impl DesignationSummary {
    fn new(designation: &str) -> Self {
        Self {
            designation: designation.to_string(),
            count: 0,
            total_debit: Decimal::ZERO,
            total_credit: Decimal::ZERO,
            total: Decimal::ZERO,
            first_date: None,
            last_date: None,
        }
    }

    fn add(&mut self, record: &TransactionRecord) {
        self.count += 1;
        self.total_debit += record.debit_amount();
        self.total_credit += record.credit_amount();
        self.total += record.amount();

        if let Some(date) = record.parsed_date() {
            self.first_date = Some(self.first_date.map_or(date, |d| d.min(date)));
            self.last_date = Some(self.last_date.map_or(date, |d| d.max(date)));
        }
    }
}

/// Group records by designation, in order of first appearance.
pub fn summarize(records: &[TransactionRecord]) -> Vec<DesignationSummary> {
    let mut summaries: Vec<DesignationSummary> = Vec::new();

    for record in records {
        let index = match summaries
            .iter()
            .position(|s| s.designation == record.designation())
        {
            Some(index) => index,
            None => {
                summaries.push(DesignationSummary::new(record.designation()));
                summaries.len() - 1
            }
        };
        summaries[index].add(record);
    }

    summaries
}

/// Net amount across all records.
pub fn grand_total(summaries: &[DesignationSummary]) -> Decimal {
    summaries.iter().map(|s| s.total).sum()
}
