//! Plausibility checks on extracted records.

use std::fmt;

use serde::Serialize;

use crate::config::ValidationLimits;
use crate::model::{is_date_shaped, TransactionRecord};

/// Why a record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// `|debit| + |credit|` below the minimum (zero-amount rows)
    MagnitudeTooSmall,
    /// `|debit| + |credit|` above the maximum (balances, account numbers)
    MagnitudeTooLarge,
    /// No `d-m-yyyy` / `d/m/yyyy` date in the date field
    InvalidDate,
    /// Designation shorter than the minimum after trimming
    InvalidDesignation,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            RejectReason::MagnitudeTooSmall => "amount is zero or too small",
            RejectReason::MagnitudeTooLarge => "amount is implausibly large",
            RejectReason::InvalidDate => "date is missing or malformed",
            RejectReason::InvalidDesignation => "designation is missing or too short",
        };
        f.write_str(msg)
    }
}

/// A dropped candidate with the reason it was dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub record: TransactionRecord,
    pub reason: RejectReason,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.record.page() > 0 {
            write!(f, "page {}: ", self.record.page())?;
        }
        write!(
            f,
            "{} {:?} ({}): {}",
            self.record.date(),
            self.record.designation(),
            self.record.amount(),
            self.reason
        )
    }
}

/// Outcome handed to the validation collaborator; never blocks a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Build a report with one message per rejection.
    pub fn from_rejections(rejections: &[Rejection]) -> Self {
        let errors: Vec<String> = rejections.iter().map(ToString::to_string).collect();
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Filters out implausible records.
#[derive(Debug, Clone, Default)]
pub struct RecordValidator {
    limits: ValidationLimits,
}

impl RecordValidator {
    pub fn new(limits: ValidationLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    /// Check one record.
    pub fn check(&self, record: &TransactionRecord) -> Result<(), RejectReason> {
        let magnitude = record.debit_amount().abs() + record.credit_amount().abs();
        if magnitude < self.limits.min_magnitude {
            return Err(RejectReason::MagnitudeTooSmall);
        }
        if magnitude > self.limits.max_magnitude {
            return Err(RejectReason::MagnitudeTooLarge);
        }
        if !is_date_shaped(record.date()) {
            return Err(RejectReason::InvalidDate);
        }
        if record.designation().trim().chars().count() < self.limits.min_designation_len {
            return Err(RejectReason::InvalidDesignation);
        }
        Ok(())
    }

    /// Keep the records that pass, in order.
    pub fn validate(&self, records: impl IntoIterator<Item = TransactionRecord>) -> Vec<TransactionRecord> {
        self.partition(records).0
    }

    /// Split records into accepted ones and rejections, both in order.
    pub fn partition(
        &self,
        records: impl IntoIterator<Item = TransactionRecord>,
    ) -> (Vec<TransactionRecord>, Vec<Rejection>) {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for record in records {
            match self.check(&record) {
                Ok(()) => accepted.push(record),
                Err(reason) => {
                    log::debug!("RecordValidator: rejected {:?}: {}", record, reason);
                    rejected.push(Rejection { record, reason });
                }
            }
        }
        (accepted, rejected)
    }

    /// Report every record that would be dropped.
    pub fn report(&self, records: &[TransactionRecord]) -> ValidationReport {
        let (_, rejected) = self.partition(records.iter().cloned());
        ValidationReport::from_rejections(&rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn rec(date: &str, designation: &str, debit: i64, credit: i64) -> TransactionRecord {
        TransactionRecord::new(
            date,
            designation,
            Decimal::new(debit, 2),
            Decimal::new(credit, 2),
        )
    }

    #[test]
    fn test_accepts_plausible_record() {
        let validator = RecordValidator::default();
        assert_eq!(validator.check(&rec("01-03-2024", "ICCN", 123456, 0)), Ok(()));
        assert_eq!(validator.check(&rec("1/3/2024", "TRSF", 0, 1)), Ok(()));
    }

    #[test]
    fn test_magnitude_bounds() {
        let validator = RecordValidator::default();
        assert_eq!(
            validator.check(&rec("01-03-2024", "ICCN", 0, 0)),
            Err(RejectReason::MagnitudeTooSmall)
        );
        // 12,345,678.00
        assert_eq!(
            validator.check(&rec("01-03-2024", "ICCN", 1_234_567_800, 0)),
            Err(RejectReason::MagnitudeTooLarge)
        );
        // exactly 10,000,000.00 is still accepted
        assert_eq!(validator.check(&rec("01-03-2024", "ICCN", 1_000_000_000, 0)), Ok(()));
    }

    #[test]
    fn test_magnitude_counts_both_sides() {
        let validator = RecordValidator::default();
        // debit and credit cancel in `amount` but not in the magnitude
        let record = rec("01-03-2024", "ICCN", 600_000_000, 600_000_000);
        assert_eq!(record.amount(), Decimal::ZERO);
        assert_eq!(validator.check(&record), Err(RejectReason::MagnitudeTooLarge));
    }

    #[test]
    fn test_date_and_designation() {
        let validator = RecordValidator::default();
        assert_eq!(
            validator.check(&rec("2024-03-01", "ICCN", 100, 0)),
            Err(RejectReason::InvalidDate)
        );
        assert_eq!(
            validator.check(&rec("01-03-2024", "  AB ", 100, 0)),
            Err(RejectReason::InvalidDesignation)
        );
    }

    #[test]
    fn test_validate_is_idempotent() {
        let validator = RecordValidator::default();
        let records = vec![
            rec("01-03-2024", "ICCN", 100, 0),
            rec("01-03-2024", "ICCN", 0, 0),
            rec("bad", "TRSF", 100, 0),
            rec("02-03-2024", "PMT TOURISME", 0, 5000),
        ];
        let once = validator.validate(records);
        let twice = validator.validate(once.clone());
        assert_eq!(once.len(), 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_report() {
        let validator = RecordValidator::default();
        let records = vec![
            rec("01-03-2024", "ICCN", 100, 0),
            rec("01-03-2024", "ICCN", 0, 0),
        ];
        let report = validator.report(&records);
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("too small"));

        assert!(validator.report(&records[..1]).is_valid);
    }

    #[test]
    fn test_custom_limits() {
        let limits = ValidationLimits {
            max_magnitude: Decimal::new(100, 0),
            ..ValidationLimits::default()
        };
        let validator = RecordValidator::new(limits);
        assert_eq!(
            validator.check(&rec("01-03-2024", "ICCN", 20000, 0)),
            Err(RejectReason::MagnitudeTooLarge)
        );
    }
}
