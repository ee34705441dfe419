//! Versioned value snapshots and optimistic concurrency.

use crate::error::{DomainError, DomainResult};

/// A record that carries a monotonically increasing version.
///
/// Collaborators bump the version on every successful write; the domain only
/// reads it so stale writes can be detected.
pub trait Versioned {
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation for a stock write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (useful for idempotent imports, migrations, etc.).
    Any,
    /// The record must not exist yet.
    New,
    /// Require the record to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    /// `current` is `None` when the record does not exist.
    pub fn matches(self, current: Option<u64>) -> bool {
        match (self, current) {
            (ExpectedVersion::Any, _) => true,
            (ExpectedVersion::New, None) => true,
            (ExpectedVersion::Exact(v), Some(actual)) => v == actual,
            _ => false,
        }
    }

    pub fn check(self, current: Option<u64>) -> DomainResult<()> {
        if self.matches(current) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "optimistic concurrency check failed (expected: {self:?}, actual: {current:?})"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_version_must_match() {
        assert!(ExpectedVersion::Exact(3).check(Some(3)).is_ok());
        let err = ExpectedVersion::Exact(3).check(Some(4)).unwrap_err();
        assert!(err.is_conflict());
        assert!(ExpectedVersion::Exact(1).check(None).is_err());
    }

    #[test]
    fn new_requires_absent_record() {
        assert!(ExpectedVersion::New.matches(None));
        assert!(!ExpectedVersion::New.matches(Some(1)));
        assert!(ExpectedVersion::Any.matches(Some(9)));
    }
}
