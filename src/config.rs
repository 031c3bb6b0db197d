//! Engine configuration.
//!
//! Every field has a default, so a JSON file only needs to name what it
//! changes:
//!
//! ```json
//! { "limits": { "max_magnitude": 50000000 } }
//! ```

use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::designation::{default_credit_keywords, DesignationMatcher, DesignationSet};
use crate::error::{Error, Result};

/// Bounds applied by the record validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    /// Smallest accepted `|debit| + |credit|`
    pub min_magnitude: Decimal,
    /// Largest accepted `|debit| + |credit|`
    pub max_magnitude: Decimal,
    /// Shortest accepted designation, in characters after trimming
    pub min_designation_len: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            min_magnitude: Decimal::new(1, 2),
            max_magnitude: Decimal::new(10_000_000, 0),
            min_designation_len: 3,
        }
    }
}

/// Configuration of the extraction pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Target designation labels, in priority order
    pub designations: DesignationSet,
    /// Narrative keywords that mark an inflow
    pub credit_keywords: Vec<String>,
    /// Validator bounds
    pub limits: ValidationLimits,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            designations: DesignationSet::default(),
            credit_keywords: default_credit_keywords(),
            limits: ValidationLimits::default(),
        }
    }
}

impl ExtractConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the designation list.
    pub fn with_designations<S: AsRef<str>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.designations = DesignationSet::new(labels);
        self
    }

    /// Replace the credit keyword list.
    pub fn with_credit_keywords<S: Into<String>>(mut self, keywords: impl IntoIterator<Item = S>) -> Self {
        self.credit_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the largest accepted record magnitude.
    pub fn with_max_magnitude(mut self, max: Decimal) -> Self {
        self.limits.max_magnitude = max;
        self
    }

    /// Parse a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject configurations the pipeline cannot work with.
    pub fn check(&self) -> Result<()> {
        if self.designations.is_empty() {
            return Err(Error::Config("designation list is empty".to_string()));
        }
        if self.limits.min_magnitude > self.limits.max_magnitude {
            return Err(Error::Config(format!(
                "min_magnitude {} exceeds max_magnitude {}",
                self.limits.min_magnitude, self.limits.max_magnitude
            )));
        }
        Ok(())
    }

    /// Build the designation matcher for this configuration.
    pub fn matcher(&self) -> DesignationMatcher {
        DesignationMatcher::new(self.designations.clone(), &self.credit_keywords)
    }
}

impl FromStr for ExtractConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_json_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExtractConfig::default();
        assert_eq!(config.designations.len(), 10);
        assert_eq!(config.credit_keywords.len(), 18);
        assert_eq!(config.limits.min_magnitude, Decimal::new(1, 2));
        assert_eq!(config.limits.max_magnitude, Decimal::new(10_000_000, 0));
        assert_eq!(config.limits.min_designation_len, 3);
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config =
            ExtractConfig::from_json_str(r#"{ "limits": { "max_magnitude": 50000000 } }"#).unwrap();
        assert_eq!(config.limits.max_magnitude, Decimal::new(50_000_000, 0));
        assert_eq!(config.limits.min_designation_len, 3);
        assert_eq!(config.designations, DesignationSet::default());
    }

    #[test]
    fn test_designations_from_json() {
        let config: ExtractConfig = r#"{ "designations": ["LOYER", "  "], "credit_keywords": ["refund"] }"#
            .parse()
            .unwrap();
        assert_eq!(config.designations.labels(), ["LOYER"]);
        assert!(config.matcher().is_likely_credit("Refund"));
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            ExtractConfig::from_json_str(r#"{ "designations": [] }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ExtractConfig::from_json_str(r#"{ "limits": { "min_magnitude": 10, "max_magnitude": 1 } }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ExtractConfig::from_json_str("{ not json"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_builder() {
        let config = ExtractConfig::new()
            .with_designations(["ICCN"])
            .with_credit_keywords(["versement"])
            .with_max_magnitude(Decimal::new(1000, 0));
        assert_eq!(config.designations.len(), 1);
        assert_eq!(config.credit_keywords, ["versement"]);
        assert_eq!(config.limits.max_magnitude, Decimal::new(1000, 0));
    }
}
