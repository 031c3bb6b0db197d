//! Header row detection and debit/credit column role inference.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amount::{is_valid_amount, parse_amount};
use crate::designation::fold;
use crate::model::{is_date_shaped, ColumnBand, ColumnRole, Row};

/// Only this many leading rows are scanned for a header.
pub const HEADER_SCAN_ROWS: usize = 5;

/// Words that mark a row as a table header.
pub const HEADER_KEYWORDS: [&str; 22] = [
    "date",
    "narrative",
    "debit",
    "credit",
    "balance",
    "transaction",
    "value",
    "montant",
    "libelle",
    "libellé",
    "designation",
    "solde",
    "operation",
    "mouvement",
    "ref",
    "reference",
    "description",
    "amount",
    "type",
    "details",
    "débit",
    "crédit",
];

const DEBIT_KEYWORDS: [&str; 4] = ["debit", "débit", "sortie", "retrait"];
const CREDIT_KEYWORDS: [&str; 6] = ["credit", "crédit", "entree", "entrée", "depot", "dépôt"];
const BALANCE_KEYWORDS: [&str; 2] = ["balance", "solde"];
const NARRATIVE_KEYWORDS: [&str; 6] = [
    "narrative",
    "libelle",
    "libellé",
    "designation",
    "description",
    "details",
];

/// Minimum amount-shaped cells for a column to count as an amount column.
const MIN_AMOUNT_HITS: usize = 2;

/// Which detection step produced the final roles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleSource {
    /// No role could be inferred
    #[default]
    None,
    /// Header keywords alone
    Header,
    /// Column content statistics filled at least one role
    Content,
    /// Positional convention
    Positional,
}

/// Debit and credit column indices of a page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoles {
    pub debit: Option<usize>,
    pub credit: Option<usize>,
    pub source: RoleSource,
}

impl ColumnRoles {
    /// Single amount column whose direction must come from the narrative.
    pub fn is_ambiguous(&self) -> bool {
        self.debit.is_some() && self.credit.is_none()
    }

    /// Check if at least one role is known.
    pub fn is_known(&self) -> bool {
        self.debit.is_some() || self.credit.is_some()
    }
}

/// Folded words of a text, split on anything that is not alphanumeric.
fn folded_words(text: &str) -> Vec<String> {
    fold(text)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Check if any word of `text` starts with one of `keywords`.
fn has_keyword(text: &str, keywords: &[&str]) -> bool {
    folded_words(text)
        .iter()
        .any(|word| keywords.iter().any(|k| word.starts_with(k)))
}

fn has_date_cell(row: &Row) -> bool {
    row.cells.iter().any(|c| is_date_shaped(&c.text))
}

/// Header strength of a row: whether it names a debit or credit column,
/// then how many of its cells carry a header keyword.
fn keyword_score(row: &Row) -> (bool, usize) {
    let names_amount = row.cells.iter().any(|c| {
        has_keyword(&c.text, &DEBIT_KEYWORDS) || has_keyword(&c.text, &CREDIT_KEYWORDS)
    });
    let keyword_cells = row
        .cells
        .iter()
        .filter(|c| has_keyword(&c.text, &HEADER_KEYWORDS))
        .count();
    (names_amount, keyword_cells)
}

fn is_text_row(row: &Row) -> bool {
    row.cells.iter().any(|c| {
        let text = c.text.trim();
        text.chars().count() > 3
            && text.chars().any(char::is_alphabetic)
            && !text.chars().all(|ch| ch.is_ascii_digit())
    })
}

/// Find the header row among the first rows of a page.
///
/// Rows holding a date-shaped cell are never headers. Among rows with an
/// accounting keyword, one naming a debit or credit column wins, then the
/// row with the most keyword cells, then the earlier row; a title line such
/// as "Type de compte: COURANT" thus loses to the column header below it.
/// Without any keyword row the first row with substantial alphabetic text
/// is taken.
pub fn find_header_row(rows: &[Row]) -> Option<usize> {
    let candidates: Vec<(usize, &Row)> = rows
        .iter()
        .take(HEADER_SCAN_ROWS)
        .enumerate()
        .filter(|(_, row)| !has_date_cell(row))
        .collect();

    let mut best: Option<(usize, (bool, usize))> = None;
    for (index, row) in &candidates {
        let score = keyword_score(row);
        if score.1 > 0 && best.map_or(true, |(_, top)| score > top) {
            best = Some((*index, score));
        }
    }

    best.map(|(index, _)| index).or_else(|| {
        candidates
            .iter()
            .find(|(_, row)| is_text_row(row))
            .map(|(i, _)| *i)
    })
}

/// Header keyword pass: first cell per family wins.
fn roles_from_header(header: &Row) -> (Option<usize>, Option<usize>) {
    let debit = header
        .cells
        .iter()
        .position(|c| has_keyword(&c.text, &DEBIT_KEYWORDS));
    let credit = header
        .cells
        .iter()
        .enumerate()
        .find(|(i, c)| Some(*i) != debit && has_keyword(&c.text, &CREDIT_KEYWORDS))
        .map(|(i, _)| i);
    (debit, credit)
}

fn balance_columns(header: Option<&Row>) -> Vec<usize> {
    header
        .map(|h| {
            h.cells
                .iter()
                .enumerate()
                .filter(|(_, c)| has_keyword(&c.text, &BALANCE_KEYWORDS))
                .map(|(i, _)| i)
                .collect()
        })
        .unwrap_or_default()
}

/// Columns ranked by how many positive amount-shaped cells they hold.
fn amount_columns(rows: &[Row], excluded: &[usize]) -> Vec<usize> {
    let width = rows.iter().map(Row::len).max().unwrap_or(0);
    let mut counts = vec![0usize; width];
    for row in rows {
        for cell in &row.cells {
            if is_valid_amount(&cell.text) && parse_amount(&cell.text) > Decimal::ZERO {
                if let Some(count) = counts.get_mut(cell.column_index) {
                    *count += 1;
                }
            }
        }
    }

    let mut ranked: Vec<(usize, usize)> = counts
        .into_iter()
        .enumerate()
        .filter(|(i, count)| *count >= MIN_AMOUNT_HITS && !excluded.contains(i))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.into_iter().map(|(i, _)| i).collect()
}

/// Check if column 1 holds value dates: date-shaped in at least half the
/// rows whose column 0 is a date.
fn has_value_date_column(rows: &[Row]) -> bool {
    let dated: Vec<&Row> = rows
        .iter()
        .filter(|r| is_date_shaped(r.cell_text(0)))
        .collect();
    if dated.is_empty() {
        return false;
    }
    let with_value_date = dated
        .iter()
        .filter(|r| is_date_shaped(r.cell_text(1)))
        .count();
    with_value_date * 2 >= dated.len()
}

/// Infer the debit and credit columns of a page.
///
/// Header keywords are tried first, then column content statistics for
/// whatever is still missing, then a positional convention when neither
/// role is known. `column_count` is the number of bands on the page.
pub fn detect_column_roles(header: Option<&Row>, rows: &[Row], column_count: usize) -> ColumnRoles {
    let mut roles = ColumnRoles::default();

    if let Some(header) = header {
        let (debit, credit) = roles_from_header(header);
        roles.debit = debit;
        roles.credit = credit;
        if roles.is_known() {
            roles.source = RoleSource::Header;
        }
    }

    if roles.debit.is_none() || roles.credit.is_none() {
        let mut excluded = balance_columns(header);
        excluded.extend(roles.debit);
        excluded.extend(roles.credit);

        let mut ranked = amount_columns(rows, &excluded).into_iter();
        let mut filled = false;
        if roles.debit.is_none() {
            if let Some(index) = ranked.next() {
                roles.debit = Some(index);
                filled = true;
            }
        }
        if roles.credit.is_none() {
            if let Some(index) = ranked.next() {
                roles.credit = Some(index);
                filled = true;
            }
        }
        if filled {
            roles.source = RoleSource::Content;
        }
    }

    if !roles.is_known() {
        if column_count >= 4 {
            let shift = usize::from(has_value_date_column(rows));
            roles.debit = Some(2 + shift);
            roles.credit = Some(3 + shift).filter(|i| *i < column_count);
            roles.source = RoleSource::Positional;
        } else if column_count == 3 {
            roles.debit = Some(2);
            roles.source = RoleSource::Positional;
        }
    }

    log::debug!(
        "RoleDetector: debit={:?} credit={:?} via {:?}",
        roles.debit,
        roles.credit,
        roles.source
    );

    roles
}

/// Label every band with its inferred role.
pub fn label_bands(bands: &mut [ColumnBand], rows: &[Row], header: Option<&Row>, roles: &ColumnRoles) {
    let balance = balance_columns(header);

    for band in bands.iter_mut() {
        let i = band.index;
        band.role = if Some(i) == roles.debit {
            ColumnRole::Debit
        } else if Some(i) == roles.credit {
            ColumnRole::Credit
        } else if balance.contains(&i) {
            ColumnRole::Balance
        } else if is_date_column(rows, i) {
            ColumnRole::Date
        } else {
            ColumnRole::Unknown
        };
    }

    if let Some(index) = narrative_column(bands, rows, header) {
        if let Some(band) = bands.get_mut(index) {
            band.role = ColumnRole::Narrative;
        }
    }
}

fn is_date_column(rows: &[Row], index: usize) -> bool {
    let filled: Vec<&str> = rows
        .iter()
        .map(|r| r.cell_text(index))
        .filter(|t| !t.trim().is_empty())
        .collect();
    !filled.is_empty() && filled.iter().filter(|t| is_date_shaped(t)).count() * 2 >= filled.len()
}

/// The narrative column: named by the header, or else the unlabeled
/// column carrying the most non-amount text.
fn narrative_column(bands: &[ColumnBand], rows: &[Row], header: Option<&Row>) -> Option<usize> {
    let unlabeled = |i: usize| {
        bands
            .get(i)
            .map_or(false, |b| b.role == ColumnRole::Unknown)
    };

    if let Some(header) = header {
        if let Some(i) = header
            .cells
            .iter()
            .position(|c| has_keyword(&c.text, &NARRATIVE_KEYWORDS))
        {
            if unlabeled(i) {
                return Some(i);
            }
        }
    }

    let mut best: Option<(usize, usize)> = None;
    for band in bands.iter().filter(|b| b.role == ColumnRole::Unknown) {
        let length: usize = rows
            .iter()
            .map(|r| r.cell_text(band.index))
            .filter(|t| !is_valid_amount(t))
            .map(|t| t.trim().chars().count())
            .sum();
        if length > 0 && best.map_or(true, |(_, l)| length > l) {
            best = Some((band.index, length));
        }
    }
    best.map(|(i, _)| i)
}
