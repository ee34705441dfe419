use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use larder_core::{BatchId, HouseholdId, QUANTITY_EPSILON, Versioned};
use larder_inventory::StockBatch;

use super::r#trait::{StockStore, StockStoreError, StockWrite};

type HouseholdStock = BTreeMap<BatchId, StockBatch>;

/// In-memory versioned stock store.
///
/// Intended for tests/dev. Writes for a household are staged on a copy and
/// swapped in only when every version check passes.
#[derive(Debug, Default)]
pub struct InMemoryStockStore {
    households: RwLock<HashMap<HouseholdId, HouseholdStock>>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a household with batches as loaded from elsewhere (versions kept as given).
    pub fn with_batches(household: HouseholdId, batches: impl IntoIterator<Item = StockBatch>) -> Self {
        let stock: HouseholdStock = batches.into_iter().map(|b| (b.id, b)).collect();
        Self {
            households: RwLock::new(HashMap::from([(household, stock)])),
        }
    }
}

impl StockStore for InMemoryStockStore {
    fn load_stock(&self, household: HouseholdId) -> Result<Vec<StockBatch>, StockStoreError> {
        let households = self
            .households
            .read()
            .map_err(|_| StockStoreError::Unavailable("lock poisoned".to_string()))?;

        Ok(households
            .get(&household)
            .map(|stock| stock.values().cloned().collect())
            .unwrap_or_default())
    }

    fn write_batches(
        &self,
        household: HouseholdId,
        writes: Vec<StockWrite>,
    ) -> Result<Vec<StockBatch>, StockStoreError> {
        if writes.is_empty() {
            return Ok(vec![]);
        }
        for (idx, w) in writes.iter().enumerate() {
            w.batch
                .validate()
                .map_err(|e| StockStoreError::InvalidWrite(format!("write {idx}: {e}")))?;
        }

        let mut households = self
            .households
            .write()
            .map_err(|_| StockStoreError::Unavailable("lock poisoned".to_string()))?;

        let current_stock = households.entry(household).or_default();
        let mut staged = current_stock.clone();
        let mut written = Vec::with_capacity(writes.len());

        for StockWrite { mut batch, expected } in writes {
            let current = staged.get(&batch.id).map(Versioned::version);
            if !expected.matches(current) {
                return Err(StockStoreError::Conflict(format!(
                    "batch {}: expected {expected:?}, found {current:?}",
                    batch.id
                )));
            }

            batch.version = current.unwrap_or(0) + 1;
            if batch.quantity <= QUANTITY_EPSILON {
                staged.remove(&batch.id);
            } else {
                staged.insert(batch.id, batch.clone());
            }
            written.push(batch);
        }

        *current_stock = staged;
        tracing::debug!(%household, writes = written.len(), "stock written");
        Ok(written)
    }
}
