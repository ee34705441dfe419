use std::sync::Arc;

use thiserror::Error;

use larder_core::{ExpectedVersion, HouseholdId};
use larder_inventory::StockBatch;

/// Stock store operation error.
///
/// Infrastructure failures, as opposed to domain errors. `Conflict` means a
/// write lost a concurrency race; the caller must reload and retry.
#[derive(Debug, Error)]
pub enum StockStoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Conflict(String),

    #[error("invalid stock write: {0}")]
    InvalidWrite(String),

    #[error("stock store unavailable: {0}")]
    Unavailable(String),
}

impl StockStoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StockStoreError::Conflict(_))
    }
}

/// One batch write and the version it expects to replace.
#[derive(Debug, Clone, PartialEq)]
pub struct StockWrite {
    pub batch: StockBatch,
    pub expected: ExpectedVersion,
}

impl StockWrite {
    pub fn new(batch: StockBatch, expected: ExpectedVersion) -> Self {
        Self { batch, expected }
    }
}

/// Household-scoped batch storage.
///
/// Implementations must:
/// - check `expected` against the stored batch version before writing
/// - store the batch at `current + 1` (or `1` for a new batch)
/// - drop batches written with zero quantity
/// - apply `write_batches` atomically: every write lands or none does
pub trait StockStore: Send + Sync {
    /// All batches currently on hand for a household.
    fn load_stock(&self, household: HouseholdId) -> Result<Vec<StockBatch>, StockStoreError>;

    /// Write one batch; returns it with its new version.
    fn write_stock(
        &self,
        household: HouseholdId,
        batch: StockBatch,
        expected: ExpectedVersion,
    ) -> Result<StockBatch, StockStoreError> {
        let mut written = self.write_batches(household, vec![StockWrite::new(batch, expected)])?;
        written
            .pop()
            .ok_or_else(|| StockStoreError::InvalidWrite("write produced no batch".to_string()))
    }

    /// Write several batches atomically, in order.
    fn write_batches(
        &self,
        household: HouseholdId,
        writes: Vec<StockWrite>,
    ) -> Result<Vec<StockBatch>, StockStoreError>;
}

impl<S> StockStore for Arc<S>
where
    S: StockStore + ?Sized,
{
    fn load_stock(&self, household: HouseholdId) -> Result<Vec<StockBatch>, StockStoreError> {
        (**self).load_stock(household)
    }

    fn write_stock(
        &self,
        household: HouseholdId,
        batch: StockBatch,
        expected: ExpectedVersion,
    ) -> Result<StockBatch, StockStoreError> {
        (**self).write_stock(household, batch, expected)
    }

    fn write_batches(
        &self,
        household: HouseholdId,
        writes: Vec<StockWrite>,
    ) -> Result<Vec<StockBatch>, StockStoreError> {
        (**self).write_batches(household, writes)
    }
}
