//! Row-pattern tier: regular expressions over each row's raw text.

use super::{Strategy, StrategyContext};
use crate::amount::find_amounts;
use crate::model::{find_date, Tier, TransactionRecord};
use crate::table::PageTable;
use crate::trace::{SkipReason, TraceEvent};

/// Extracts one record per row whose text holds a date, a target
/// designation and an amount. Column roles are ignored.
#[derive(Debug, Clone, Default)]
pub struct RowPatternStrategy;

impl RowPatternStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for RowPatternStrategy {
    fn tier(&self) -> Tier {
        Tier::RowPattern
    }

    fn attempt(&self, table: &PageTable, ctx: &StrategyContext<'_>) -> Vec<TransactionRecord> {
        let mut records = Vec::new();

        for (index, row) in table.rows.iter().enumerate() {
            let text = row.text();
            let reason = match (
                find_date(&text),
                ctx.matcher.match_exact(&text),
                find_amounts(&text).first(),
            ) {
                (Some(date), Some(designation), Some(&value)) => {
                    let record = if ctx.matcher.is_likely_credit(&text) {
                        TransactionRecord::credit(date, designation, value)
                    } else {
                        TransactionRecord::debit(date, designation, value)
                    };
                    records.push(record);
                    continue;
                }
                (None, _, _) => SkipReason::NoDate,
                (_, None, _) => SkipReason::NoDesignation,
                (_, _, None) => SkipReason::NoAmount,
            };

            ctx.tracer.emit(|| TraceEvent::RowSkipped {
                page: table.page,
                tier: Tier::RowPattern,
                row: index,
                reason,
            });
        }

        records
    }
}
