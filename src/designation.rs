//! Designation matching and credit-direction heuristics.
//!
//! A statement narrative such as `"PMT TOURISME REF 0041 KINSHASA"` is mapped
//! onto one label of a fixed target list. Matching is case-insensitive and
//! works on NFC-normalized text, so precomposed and decomposed accents
//! compare equal.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Target labels used when no list is configured.
pub const DEFAULT_DESIGNATIONS: [&str; 10] = [
    "PYT FPT",
    "TRSF",
    "PMT TOURISME",
    "FPT INVESTISSEMENT",
    "ONT FICHE STATISTIQUES",
    "APPUI ADM DU TOURISME",
    "ICCN",
    "SITE TOURISTIQUE",
    "COMITE DE SUIVI ET VALIDATION",
    "ONT CONTROLE ET INSPECTION DES UNITES TOURISTIQUES",
];

/// Narrative keywords that mark an inflow.
pub const DEFAULT_CREDIT_KEYWORDS: [&str; 18] = [
    "depot",
    "dépôt",
    "versement",
    "virement reçu",
    "recette",
    "encaissement",
    "credit",
    "crédit",
    "remboursement",
    "interet",
    "intérêt",
    "dividende",
    "salaire",
    "pension",
    "allocation",
    "subvention",
    "don",
    "recettes",
];

/// Normalize text for comparisons: NFC, then lowercase.
pub(crate) fn fold(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}

/// Collapse whitespace runs to single spaces.
fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Ordered, immutable list of target designation labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct DesignationSet {
    labels: Vec<String>,
}

impl DesignationSet {
    /// Create a set from labels; blank labels are ignored and the
    /// remaining ones are trimmed.
    pub fn new<S: AsRef<str>>(labels: impl IntoIterator<Item = S>) -> Self {
        let labels = labels
            .into_iter()
            .map(|l| squash(l.as_ref()))
            .filter(|l| !l.is_empty())
            .collect();
        Self { labels }
    }

    /// Labels in priority order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Iterate over labels in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if the set has no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl From<Vec<String>> for DesignationSet {
    fn from(labels: Vec<String>) -> Self {
        Self::new(labels)
    }
}

impl From<DesignationSet> for Vec<String> {
    fn from(set: DesignationSet) -> Self {
        set.labels
    }
}

impl Default for DesignationSet {
    fn default() -> Self {
        Self::new(DEFAULT_DESIGNATIONS)
    }
}

/// Default credit keyword list as owned strings.
pub fn default_credit_keywords() -> Vec<String> {
    DEFAULT_CREDIT_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

/// Maps narratives to target labels and guesses the flow direction.
#[derive(Debug, Clone)]
pub struct DesignationMatcher {
    set: DesignationSet,
    folded: Vec<String>,
    credit_keywords: Vec<String>,
}

impl DesignationMatcher {
    /// Create a matcher over a designation set and a credit keyword list.
    pub fn new<S: AsRef<str>>(set: DesignationSet, credit_keywords: &[S]) -> Self {
        let folded = set.iter().map(fold).collect();
        let credit_keywords = credit_keywords
            .iter()
            .map(|k| fold(k.as_ref().trim()))
            .filter(|k| !k.is_empty())
            .collect();
        Self {
            set,
            folded,
            credit_keywords,
        }
    }

    /// The designation set this matcher was built with.
    pub fn designations(&self) -> &DesignationSet {
        &self.set
    }

    /// Match a narrative against the target list.
    ///
    /// The whole list is first scanned for a label contained verbatim in the
    /// narrative; only if none is found is it scanned again accepting a
    /// label whose every word occurs somewhere in the narrative.
    pub fn match_designation(&self, narrative: &str) -> Option<&str> {
        let text = fold(narrative);
        self.exact_index(&text)
            .or_else(|| {
                self.folded.iter().position(|label| {
                    label
                        .split_whitespace()
                        .all(|word| text.contains(word))
                })
            })
            .map(|i| self.set.labels[i].as_str())
    }

    /// Match a narrative against the target list, substring pass only.
    pub fn match_exact(&self, narrative: &str) -> Option<&str> {
        self.exact_index(&fold(narrative))
            .map(|i| self.set.labels[i].as_str())
    }

    fn exact_index(&self, folded_text: &str) -> Option<usize> {
        self.folded
            .iter()
            .position(|label| folded_text.contains(label.as_str()))
    }

    /// Map captured label text (any case, any spacing) to its canonical label.
    pub fn canonical(&self, label_text: &str) -> Option<&str> {
        let wanted = squash(&fold(label_text));
        self.folded
            .iter()
            .position(|label| *label == wanted)
            .map(|i| self.set.labels[i].as_str())
            .or_else(|| self.match_designation(label_text))
    }

    /// Check if text reads like an inflow.
    ///
    /// A keyword must start at a word boundary: `don` does not fire inside
    /// `abandon`, while `remboursement` still matches `remboursements`.
    pub fn is_likely_credit(&self, text: &str) -> bool {
        let text = fold(text);
        self.credit_keywords
            .iter()
            .any(|keyword| starts_word(&text, keyword))
    }
}

impl Default for DesignationMatcher {
    fn default() -> Self {
        Self::new(DesignationSet::default(), &DEFAULT_CREDIT_KEYWORDS)
    }
}

fn starts_word(text: &str, keyword: &str) -> bool {
    text.match_indices(keyword).any(|(pos, _)| {
        text[..pos]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric())
    })
}
