//! Row grouping by baseline position.

use crate::model::TextFragment;

/// Candidate row tolerances in points, smallest first.
pub const ROW_TOLERANCES: [f32; 4] = [2.0, 5.0, 8.0, 12.0];

/// Fragments sharing one quantized baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroup {
    /// Quantized baseline (`bucket * tolerance`)
    pub y: f32,
    /// Fragments of the row, ordered by x
    pub fragments: Vec<TextFragment>,
}

/// Result of row grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGrouping {
    /// Rows ordered top to bottom (descending y)
    pub rows: Vec<RowGroup>,
    /// Tolerance the grouping was made with
    pub tolerance: f32,
}

fn bucket_of(y: f32, tolerance: f32) -> i64 {
    (y / tolerance).round() as i64
}

/// Count distinct buckets for a tolerance.
fn bucket_count(fragments: &[TextFragment], tolerance: f32) -> usize {
    let mut buckets: Vec<i64> = fragments
        .iter()
        .map(|f| bucket_of(f.y, tolerance))
        .collect();
    buckets.sort_unstable();
    buckets.dedup();
    buckets.len()
}

/// Pick the row tolerance.
///
/// The tolerance producing the most buckets wins, as long as the bucket
/// count stays below half the fragment count. When no candidate satisfies
/// that, the smallest candidate is used.
pub fn choose_row_tolerance(fragments: &[TextFragment]) -> f32 {
    let limit = fragments.len() as f32 / 2.0;
    let mut best = ROW_TOLERANCES[0];
    let mut best_count = 0;

    for tolerance in ROW_TOLERANCES {
        let count = bucket_count(fragments, tolerance);
        if count > best_count && (count as f32) < limit {
            best_count = count;
            best = tolerance;
        }
    }

    best
}

/// Group fragments into rows.
pub fn group_rows(fragments: &[TextFragment]) -> RowGrouping {
    let tolerance = choose_row_tolerance(fragments);

    let mut keyed: Vec<(i64, &TextFragment)> = fragments
        .iter()
        .map(|f| (bucket_of(f.y, tolerance), f))
        .collect();
    // Descending bucket, then ascending x; stable so equal x keeps content order.
    keyed.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.x.total_cmp(&b.1.x)));

    let mut rows: Vec<RowGroup> = Vec::new();
    let mut current: Option<i64> = None;
    for (bucket, fragment) in keyed {
        if current != Some(bucket) {
            rows.push(RowGroup {
                y: bucket as f32 * tolerance,
                fragments: Vec::new(),
            });
            current = Some(bucket);
        }
        if let Some(row) = rows.last_mut() {
            row.fragments.push(fragment.clone());
        }
    }

    log::debug!(
        "RowGrouper: {} fragments -> {} rows (tolerance {})",
        fragments.len(),
        rows.len(),
        tolerance
    );

    RowGrouping { rows, tolerance }
}
