//! Verification reports

use crate::error::{VerificationError, Violation, ViolationKind};
use std::fmt;
use tether_domain::OperationId;

/// Which property a report covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Check {
    /// Every non-excluded operation reaches the delegate intact
    Forwarding,

    /// Every fluent operation returns the wrapper itself
    ReturnsSelf,

    /// Excluded operations never reach the delegate
    Exclusions,

    /// Terminal operations return the delegate's product unchanged
    BuildPassThrough,
}

impl Check {
    /// Get the check name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Check::Forwarding => "forwarding",
            Check::ReturnsSelf => "returns-self",
            Check::Exclusions => "exclusions",
            Check::BuildPassThrough => "build pass-through",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of checking one operation
#[derive(Debug)]
pub enum Outcome {
    /// All expectations held
    Passed,

    /// Not checked (excluded)
    Skipped,

    /// First broken expectation
    Failed(Violation),
}

/// One operation's entry in a report
#[derive(Debug)]
pub struct OperationReport {
    /// Operation checked
    pub operation: OperationId,

    /// What happened
    pub outcome: Outcome,
}

/// Per-operation results of one verification run
#[derive(Debug)]
pub struct VerificationReport {
    /// Interface name
    pub interface: &'static str,

    /// Property checked
    pub check: Check,

    /// Entries in declaration order
    pub entries: Vec<OperationReport>,
}

impl VerificationReport {
    pub(crate) fn new(interface: &'static str, check: Check) -> Self {
        Self {
            interface,
            check,
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, operation: OperationId, outcome: Outcome) {
        self.entries.push(OperationReport { operation, outcome });
    }

    /// Returns `true` if no operation failed
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// Every violation, in declaration order
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.entries.iter().filter_map(|e| match &e.outcome {
            Outcome::Failed(v) => Some(v),
            _ => None,
        })
    }

    /// Violations of one category
    pub fn violations_of(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations().filter(move |v| v.kind() == kind)
    }

    /// Violation reported against `operation`, if any
    pub fn violation_for(&self, operation: &OperationId) -> Option<&Violation> {
        self.violations().find(|v| v.operation() == operation)
    }

    /// Number of operations that passed
    pub fn passed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, Outcome::Passed))
            .count()
    }

    /// Number of operations skipped
    pub fn skipped_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, Outcome::Skipped))
            .count()
    }

    /// Number of operations that failed
    pub fn failed_count(&self) -> usize {
        self.violations().count()
    }

    /// Convert into a `Result`
    pub fn into_result(self) -> Result<(), VerificationError> {
        if self.is_success() {
            Ok(())
        } else {
            Err(VerificationError::Failed(self))
        }
    }

    /// Panic with a readable summary unless every operation passed
    #[track_caller]
    pub fn assert_success(&self) {
        if !self.is_success() {
            panic!("{}", self);
        }
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} check on {}: {} passed, {} skipped, {} failed",
            self.check,
            self.interface,
            self.passed_count(),
            self.skipped_count(),
            self.failed_count()
        )?;
        for violation in self.violations() {
            write!(f, "\n  - {}", violation)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> VerificationReport {
        let mut report = VerificationReport::new("Lamp", Check::Forwarding);
        report.push(OperationId::new("on", []), Outcome::Passed);
        report.push(OperationId::new("off", []), Outcome::Skipped);
        report.push(
            OperationId::new("dim", []),
            Outcome::Failed(Violation::NotForwarded {
                operation: OperationId::new("dim", []),
            }),
        );
        report
    }

    #[test]
    fn test_counts() {
        let report = report();
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!(!report.is_success());
        assert!(report.violation_for(&OperationId::new("dim", [])).is_some());
        assert_eq!(report.violations_of(ViolationKind::Contract).count(), 1);
        assert_eq!(report.violations_of(ViolationKind::Identity).count(), 0);
    }

    #[test]
    fn test_display_lists_violations() {
        let text = report().to_string();
        assert!(text.starts_with("forwarding check on Lamp: 1 passed, 1 skipped, 1 failed"));
        assert!(text.contains("dim() was not forwarded to the delegate"));
    }

    #[test]
    fn test_into_result() {
        assert!(report().into_result().is_err());
        assert!(VerificationReport::new("Lamp", Check::ReturnsSelf).into_result().is_ok());
    }

    #[test]
    #[should_panic(expected = "was not forwarded")]
    fn test_assert_success_panics() {
        report().assert_success();
    }
}
