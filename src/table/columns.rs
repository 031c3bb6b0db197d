//! Column band detection by clustering fragment x positions.

use crate::model::{ColumnBand, TextFragment, PAGE_WIDTH_SENTINEL};

/// Candidate column tolerances in points, smallest first.
pub const COLUMN_TOLERANCES: [f32; 5] = [10.0, 15.0, 20.0, 25.0, 30.0];

/// Column counts accepted without falling back.
pub const MIN_COLUMNS: usize = 3;
pub const MAX_COLUMNS: usize = 8;

/// Result of column detection.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    /// Bands ordered left to right
    pub bands: Vec<ColumnBand>,
    /// Tolerance the clustering was made with
    pub tolerance: f32,
}

/// Cluster sorted distinct x values; a cluster starts whenever x is at
/// least `tolerance` away from the previous cluster start.
fn cluster_starts(xs: &[f32], tolerance: f32) -> Vec<f32> {
    let mut starts: Vec<f32> = Vec::new();
    for &x in xs {
        match starts.last() {
            Some(&start) if x - start < tolerance => {}
            _ => starts.push(x),
        }
    }
    starts
}

fn bands_from_starts(starts: &[f32]) -> Vec<ColumnBand> {
    starts
        .iter()
        .enumerate()
        .map(|(i, &min_x)| {
            let max_x = starts.get(i + 1).copied().unwrap_or(PAGE_WIDTH_SENTINEL);
            ColumnBand::new(i, min_x, max_x)
        })
        .collect()
}

/// Detect column bands.
///
/// The smallest tolerance giving between 3 and 8 clusters wins; if none
/// does, the smallest tolerance's clustering is used as is.
pub fn detect_columns(fragments: &[TextFragment]) -> ColumnLayout {
    let mut xs: Vec<f32> = fragments.iter().map(|f| f.x).collect();
    xs.sort_by(f32::total_cmp);
    xs.dedup();

    for tolerance in COLUMN_TOLERANCES {
        let starts = cluster_starts(&xs, tolerance);
        if (MIN_COLUMNS..=MAX_COLUMNS).contains(&starts.len()) {
            log::debug!(
                "ColumnDetector: tolerance {} gives {} columns at {:?}",
                tolerance,
                starts.len(),
                starts
            );
            return ColumnLayout {
                bands: bands_from_starts(&starts),
                tolerance,
            };
        }
    }

    let tolerance = COLUMN_TOLERANCES[0];
    let starts = cluster_starts(&xs, tolerance);
    log::debug!(
        "ColumnDetector: no tolerance in range, falling back to {} columns",
        starts.len()
    );
    ColumnLayout {
        bands: bands_from_starts(&starts),
        tolerance,
    }
}
