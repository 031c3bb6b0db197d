//! Positioned text fragments.

use serde::{Deserialize, Serialize};

/// One run of text from a page content stream.
///
/// `x` and `y` are the translation components (entries 4 and 5) of the
/// text-rendering transform, i.e. the baseline origin in page space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// The text content
    pub text: String,
    /// X position (left edge of the baseline)
    pub x: f32,
    /// Y position (baseline, larger is higher on the page)
    pub y: f32,
}

impl TextFragment {
    /// Create a new fragment.
    pub fn new(text: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
        }
    }

    /// Build a fragment from a 2D affine transform `[a, b, c, d, e, f]`.
    pub fn from_transform(text: impl Into<String>, transform: [f32; 6]) -> Self {
        Self::new(text, transform[4], transform[5])
    }
}

/// Join fragment texts in content order with single spaces.
pub fn joined_text(fragments: &[TextFragment]) -> String {
    fragments
        .iter()
        .map(|f| f.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transform() {
        let frag = TextFragment::from_transform("ICCN", [1.0, 0.0, 0.0, 1.0, 72.5, 640.0]);
        assert_eq!(frag.x, 72.5);
        assert_eq!(frag.y, 640.0);
    }

    #[test]
    fn test_joined_text() {
        let frags = vec![
            TextFragment::new("01-03-2024", 40.0, 700.0),
            TextFragment::new("  ", 90.0, 700.0),
            TextFragment::new("ICCN ", 120.0, 700.0),
        ];
        assert_eq!(joined_text(&frags), "01-03-2024 ICCN");
    }
}
