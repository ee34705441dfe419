//! Domain error model.

use chrono::NaiveDate;
use thiserror::Error;

use crate::quantity::Unit;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// These are the *fatal* failures of a domain operation: malformed input is
/// rejected before any computation happens. Partial failures (dietary
/// violations, unresolved ingredients) are not errors; they travel alongside
/// results as warnings.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Two quantities with incompatible units were compared, summed or converted.
    #[error("unit mismatch: expected {expected}, found {found}")]
    UnitMismatch { expected: Unit, found: Unit },

    /// A date range was malformed (end before start).
    #[error("invalid date range: {start} .. {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A stock write lost an optimistic concurrency race.
    ///
    /// Callers must retry against a fresh snapshot.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn unit_mismatch(expected: Unit, found: Unit) -> Self {
        Self::UnitMismatch { expected, found }
    }

    pub fn invalid_range(start: NaiveDate, end: NaiveDate) -> Self {
        Self::InvalidRange { start, end }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Whether the error is a lost concurrency race (retry with a fresh snapshot).
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
