//! Plain text rendering: aligned tables for terminals and logs.

use std::fmt::Write;

use crate::model::{ColumnRole, TransactionRecord};
use crate::summary::{grand_total, DesignationSummary};
use crate::table::PageTable;

/// Column alignment.
#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

/// Lay out rows under a header with space-padded columns.
fn layout(header: &[&str], align: &[Align], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    push_line(&mut output, &widths, align, header);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let rule: Vec<&str> = rule.iter().map(String::as_str).collect();
    push_line(&mut output, &widths, align, &rule);
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        push_line(&mut output, &widths, align, &cells);
    }

    output
}

fn push_line(output: &mut String, widths: &[usize], align: &[Align], cells: &[&str]) {
    let mut text = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            text.push_str("  ");
        }
        let pad = " ".repeat(widths[i].saturating_sub(cell.chars().count()));
        match align[i] {
            Align::Left => {
                text.push_str(cell);
                text.push_str(&pad);
            }
            Align::Right => {
                text.push_str(&pad);
                text.push_str(cell);
            }
        }
    }
    output.push_str(text.trim_end());
    output.push('\n');
}

/// Render records as an aligned table.
pub fn to_text(records: &[TransactionRecord]) -> String {
    if records.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.page().to_string(),
                r.date().to_string(),
                r.designation().to_string(),
                format!("{:.2}", r.debit_amount()),
                format!("{:.2}", r.credit_amount()),
                format!("{:.2}", r.amount()),
                r.tier().map(|t| t.as_str()).unwrap_or("-").to_string(),
            ]
        })
        .collect();

    use Align::*;
    layout(
        &["Page", "Date", "Designation", "Debit", "Credit", "Amount", "Tier"],
        &[Right, Left, Left, Right, Right, Right, Left],
        &rows,
    )
}

/// Render per-designation totals with a closing grand total.
pub fn summary_to_text(summaries: &[DesignationSummary]) -> String {
    if summaries.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let date = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.format("%d-%m-%Y").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    let rows: Vec<Vec<String>> = summaries
        .iter()
        .map(|s| {
            vec![
                s.designation.clone(),
                s.count.to_string(),
                format!("{:.2}", s.total_debit),
                format!("{:.2}", s.total_credit),
                format!("{:.2}", s.total),
                date(s.first_date),
                date(s.last_date),
            ]
        })
        .collect();

    use Align::*;
    let mut output = layout(
        &["Designation", "Count", "Debit", "Credit", "Total", "First", "Last"],
        &[Left, Right, Right, Right, Right, Left, Left],
        &rows,
    );
    let _ = writeln!(output, "\nNet total: {:.2}", grand_total(summaries));
    output
}

fn role_label(role: ColumnRole) -> &'static str {
    match role {
        ColumnRole::Unknown => "?",
        ColumnRole::Date => "date",
        ColumnRole::Narrative => "narrative",
        ColumnRole::Debit => "debit",
        ColumnRole::Credit => "credit",
        ColumnRole::Balance => "balance",
    }
}

/// Dump a reconstructed page: tolerances, bands with roles, then rows.
pub fn table_to_text(table: &PageTable) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Page {}: {} rows, {} columns (row tolerance {}, column tolerance {})",
        table.page,
        table.rows.len(),
        table.column_count(),
        table.row_tolerance,
        table.column_tolerance
    );
    let _ = writeln!(
        output,
        "Roles: debit={:?} credit={:?} ({:?}), header row: {}",
        table.roles.debit,
        table.roles.credit,
        table.roles.source,
        table
            .header
            .map(|h| h.to_string())
            .unwrap_or_else(|| "none".to_string())
    );

    if table.is_empty() {
        output.push_str("(no text)\n");
        return output;
    }

    let header: Vec<String> = table
        .bands
        .iter()
        .map(|b| format!("{}:{}@{}", b.index, role_label(b.role), b.min_x))
        .collect();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let marker = if Some(i) == table.header { "H" } else { "" };
            let mut cells = vec![format!("{}{}", marker, i)];
            cells.extend((0..table.bands.len()).map(|c| row.cell_text(c).to_string()));
            cells
        })
        .collect();

    let mut titles: Vec<&str> = vec!["#"];
    titles.extend(header.iter().map(String::as_str));
    let align = vec![Align::Left; titles.len()];
    output.push_str(&layout(&titles, &align, &rows));
    output
}
