//! Cell assignment: distributing a row's fragments over column bands.

use crate::model::{Cell, ColumnBand, TextFragment};

/// Index of the band whose start is nearest to `x`; ties go to the left.
///
/// Returns `None` only when there are no bands.
pub fn nearest_band(x: f32, bands: &[ColumnBand]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, band) in bands.iter().enumerate() {
        let distance = (x - band.min_x).abs();
        match best {
            Some((_, d)) if distance >= d => {}
            _ => best = Some((i, distance)),
        }
    }
    best.map(|(i, _)| i)
}

/// Build one cell per band from a row's fragments.
///
/// Every fragment lands in exactly one cell. Texts sharing a band are
/// joined in x order with single spaces and trimmed; bands that received
/// nothing get an empty placeholder.
pub fn assign_cells(fragments: &[TextFragment], bands: &[ColumnBand]) -> Vec<Cell> {
    let mut sorted: Vec<&TextFragment> = fragments.iter().collect();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut contents: Vec<Vec<&str>> = vec![Vec::new(); bands.len()];
    for fragment in sorted {
        if let Some(index) = nearest_band(fragment.x, bands) {
            let text = fragment.text.trim();
            if !text.is_empty() {
                contents[index].push(text);
            }
        }
    }

    contents
        .into_iter()
        .enumerate()
        .map(|(index, parts)| Cell::new(parts.join(" ").trim(), index))
        .collect()
}
