//! Table reconstruction from positioned text fragments.
//!
//! A statement page arrives as an unordered bag of fragments. This module
//! recovers its row/column structure in four steps:
//!
//! 1. [`rows::group_rows`] buckets fragments by baseline
//! 2. [`columns::detect_columns`] clusters x positions into column bands
//! 3. [`cells::assign_cells`] distributes each row's fragments over the bands
//! 4. [`roles`] finds the header row and the debit/credit columns
//!
//! Everything is recomputed per page; nothing carries over between pages.

pub mod cells;
pub mod columns;
pub mod roles;
pub mod rows;

use serde::Serialize;

pub use cells::assign_cells;
pub use columns::{detect_columns, ColumnLayout};
pub use roles::{detect_column_roles, find_header_row, ColumnRoles, RoleSource};
pub use rows::{group_rows, RowGroup, RowGrouping};

use crate::model::{joined_text, ColumnBand, Row, TextFragment, PAGE_WIDTH_SENTINEL};

/// The reconstructed table of one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageTable {
    /// 1-based page number
    pub page: u32,
    /// Rows, top to bottom
    pub rows: Vec<Row>,
    /// Column bands, left to right
    pub bands: Vec<ColumnBand>,
    /// Index into `rows` of the header row, if one was found
    pub header: Option<usize>,
    /// Debit/credit column indices
    pub roles: ColumnRoles,
    /// Tolerance used for row grouping
    pub row_tolerance: f32,
    /// Tolerance used for column clustering
    pub column_tolerance: f32,
    /// All fragment texts joined with single spaces, in content order
    pub raw_text: String,
}

impl PageTable {
    /// The header row, if any.
    pub fn header_row(&self) -> Option<&Row> {
        self.header.and_then(|i| self.rows.get(i))
    }

    /// Rows other than the header, with their indices.
    pub fn body_rows(&self) -> impl Iterator<Item = (usize, &Row)> {
        let header = self.header;
        self.rows
            .iter()
            .enumerate()
            .filter(move |(i, _)| Some(*i) != header)
    }

    /// Number of column bands.
    pub fn column_count(&self) -> usize {
        self.bands.len()
    }

    /// Check if the page produced no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Build a page table from already-split rows.
    ///
    /// Bands are synthesized 100pt apart, one per column of the widest row.
    /// Header and column roles are detected as for a real page.
    pub fn from_rows(page: u32, rows: Vec<Row>) -> Self {
        let width = rows.iter().map(Row::len).max().unwrap_or(0);
        let mut bands: Vec<ColumnBand> = (0..width)
            .map(|i| {
                let min_x = i as f32 * 100.0;
                let max_x = if i + 1 == width {
                    PAGE_WIDTH_SENTINEL
                } else {
                    min_x + 100.0
                };
                ColumnBand::new(i, min_x, max_x)
            })
            .collect();

        let header = find_header_row(&rows);
        let header_row = header.and_then(|i| rows.get(i));
        let roles = detect_column_roles(header_row, &rows, width);
        roles::label_bands(&mut bands, &rows, header_row, &roles);

        let raw_text = rows
            .iter()
            .map(Row::text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            page,
            rows,
            bands,
            header,
            roles,
            row_tolerance: rows::ROW_TOLERANCES[0],
            column_tolerance: columns::COLUMN_TOLERANCES[0],
            raw_text,
        }
    }
}

/// Reconstruct the table of one page.
///
/// Whitespace-only fragments are left out of the geometry.
pub fn analyze_page(page: u32, fragments: &[TextFragment]) -> PageTable {
    let visible: Vec<TextFragment> = fragments
        .iter()
        .filter(|f| !f.text.trim().is_empty())
        .cloned()
        .collect();

    log::debug!(
        "analyze_page: page {} has {} fragments ({} visible)",
        page,
        fragments.len(),
        visible.len()
    );

    let grouping = group_rows(&visible);
    let layout = detect_columns(&visible);
    let mut bands = layout.bands;

    let rows: Vec<Row> = grouping
        .rows
        .iter()
        .map(|group| Row::new(group.y, assign_cells(&group.fragments, &bands)))
        .collect();

    let header = find_header_row(&rows);
    let header_row = header.and_then(|i| rows.get(i));
    let roles = detect_column_roles(header_row, &rows, bands.len());
    roles::label_bands(&mut bands, &rows, header_row, &roles);

    PageTable {
        page,
        rows,
        bands,
        header,
        roles,
        row_tolerance: grouping.tolerance,
        column_tolerance: layout.tolerance,
        raw_text: joined_text(fragments),
    }
}
