//! Column-structure tier: reads amounts through the detected column roles.

use rust_decimal::Decimal;

use super::{Strategy, StrategyContext};
use crate::amount::{is_valid_amount, parse_amount};
use crate::model::{find_date, Row, Tier, TransactionRecord};
use crate::table::PageTable;
use crate::trace::{SkipReason, TraceEvent};

/// Narratives must be longer than this many characters.
const MIN_NARRATIVE_LEN: usize = 5;

/// Extracts records from rows using the page's debit/credit columns.
///
/// Only runs when at least one role is known. For every body row it needs
/// a date cell, a narrative cell and a designation match on that narrative.
#[derive(Debug, Clone, Default)]
pub struct ColumnStrategy;

impl ColumnStrategy {
    pub fn new() -> Self {
        Self
    }
}

/// The longest cell that is neither a date nor a bare amount.
fn narrative_cell(row: &Row) -> Option<&str> {
    let mut best: Option<&str> = None;
    for cell in &row.cells {
        let text = cell.text.trim();
        if text.chars().count() <= MIN_NARRATIVE_LEN
            || find_date(text).is_some()
            || is_valid_amount(text)
        {
            continue;
        }
        if best.map_or(true, |b| text.chars().count() > b.chars().count()) {
            best = Some(text);
        }
    }
    best
}

impl Strategy for ColumnStrategy {
    fn tier(&self) -> Tier {
        Tier::ColumnStructure
    }

    fn attempt(&self, table: &PageTable, ctx: &StrategyContext<'_>) -> Vec<TransactionRecord> {
        let roles = table.roles;
        if !roles.is_known() {
            log::debug!("ColumnStrategy: page {} has no amount columns", table.page);
            return Vec::new();
        }

        let page = table.page;
        let skip = |row: usize, reason: SkipReason| {
            ctx.tracer.emit(|| TraceEvent::RowSkipped {
                page,
                tier: Tier::ColumnStructure,
                row,
                reason,
            });
        };

        let mut records = Vec::new();
        for (index, row) in table.body_rows() {
            let Some(date) = row.cells.iter().find_map(|c| find_date(&c.text)) else {
                skip(index, SkipReason::NoDate);
                continue;
            };
            let Some(narrative) = narrative_cell(row) else {
                skip(index, SkipReason::NoNarrative);
                continue;
            };
            let Some(designation) = ctx.matcher.match_designation(narrative) else {
                skip(index, SkipReason::NoDesignation);
                continue;
            };

            let signed = |column: Option<usize>| {
                column
                    .map(|i| parse_amount(row.cell_text(i)))
                    .unwrap_or(Decimal::ZERO)
            };

            let (debit, credit) = if roles.is_ambiguous() {
                let value = signed(roles.debit);
                if value.is_sign_negative() && !value.is_zero() {
                    (value.abs(), Decimal::ZERO)
                } else if ctx.matcher.is_likely_credit(narrative) {
                    (Decimal::ZERO, value)
                } else {
                    (value, Decimal::ZERO)
                }
            } else {
                (signed(roles.debit).abs(), signed(roles.credit).abs())
            };

            records.push(TransactionRecord::new(date, designation, debit, credit));
        }

        records
    }
}
