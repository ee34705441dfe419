//! Authoritative in-memory view of stock quantities and batches.
//!
//! The ledger owns no persistence: it reflects whatever batches the
//! collaborator layer loaded. Each item has one canonical unit (the unit of the
//! first batch seen); later batches are converted into it, and batches in an
//! incompatible unit are refused with `UnitMismatch`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use larder_core::{
    BatchId, DomainError, DomainResult, ItemId, QUANTITY_EPSILON, Quantity, Unit, UnitTable,
};

use crate::batch::StockBatch;

/// A logical food item aggregating its batches in FIFO (expiry) order.
///
/// Invariant: `total()` is the sum of the batch quantities, all expressed in `unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    item: ItemId,
    unit: Unit,
    batches: Vec<StockBatch>,
}

impl StockItem {
    fn new(item: ItemId, unit: Unit) -> Self {
        Self {
            item,
            unit,
            batches: Vec::new(),
        }
    }

    pub fn item(&self) -> &ItemId {
        &self.item
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Batches, nearest expiry first.
    pub fn batches(&self) -> &[StockBatch] {
        &self.batches
    }

    pub fn total(&self) -> Quantity {
        Quantity::new(self.batches.iter().map(|b| b.quantity).sum(), self.unit)
    }

    /// Quantity still usable on `date` (expired batches excluded).
    pub fn usable_on(&self, date: NaiveDate) -> Quantity {
        Quantity::new(
            self.batches
                .iter()
                .filter(|b| b.is_usable_on(date))
                .map(|b| b.quantity)
                .sum(),
            self.unit,
        )
    }

    /// Quantity on hand and usable on `date`: batches acquired after `date` are
    /// not counted yet.
    pub fn available_on(&self, date: NaiveDate) -> Quantity {
        Quantity::new(
            self.batches
                .iter()
                .filter(|b| b.is_available_on(date))
                .map(|b| b.quantity)
                .sum(),
            self.unit,
        )
    }

    fn insert(&mut self, batch: StockBatch) {
        let pos = self
            .batches
            .partition_point(|existing| existing.fifo_cmp(&batch).is_lt());
        self.batches.insert(pos, batch);
    }
}

/// Immutable view of all stock items at the time it was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    items: Vec<StockItem>,
}

impl StockSnapshot {
    /// Items ordered by identifier.
    pub fn items(&self) -> &[StockItem] {
        &self.items
    }

    pub fn get(&self, item: &ItemId) -> Option<&StockItem> {
        self.items
            .binary_search_by(|i| i.item.cmp(item))
            .ok()
            .map(|idx| &self.items[idx])
    }
}

/// One batch touched by an explicit depletion.
///
/// `version` is the batch version the draw was computed against; the
/// collaborator writes the new quantity with that expectation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchDraw {
    pub batch: BatchId,
    pub taken: Quantity,
    pub remaining: Quantity,
    pub version: u64,
}

/// The household's stock, keyed by item.
#[derive(Debug, Clone, PartialEq)]
pub struct StockLedger {
    items: BTreeMap<ItemId, StockItem>,
    units: UnitTable,
}

impl Default for StockLedger {
    fn default() -> Self {
        Self::new(UnitTable::default())
    }
}

impl StockLedger {
    pub fn new(units: UnitTable) -> Self {
        Self {
            items: BTreeMap::new(),
            units,
        }
    }

    /// Build a ledger from loaded batches (fails on the first invalid batch).
    pub fn from_batches(
        batches: impl IntoIterator<Item = StockBatch>,
        units: UnitTable,
    ) -> DomainResult<Self> {
        let mut ledger = Self::new(units);
        for batch in batches {
            ledger.restock(batch)?;
        }
        Ok(ledger)
    }

    pub fn units(&self) -> &UnitTable {
        &self.units
    }

    pub fn item(&self, item: &ItemId) -> Option<&StockItem> {
        self.items.get(item)
    }

    pub fn items(&self) -> impl Iterator<Item = &StockItem> {
        self.items.values()
    }

    /// All batches, grouped by item, FIFO within an item.
    pub fn batches(&self) -> impl Iterator<Item = &StockBatch> {
        self.items.values().flat_map(|i| i.batches.iter())
    }

    /// Canonical unit for `item`, if the ledger has seen it.
    pub fn unit_of(&self, item: &ItemId) -> Option<Unit> {
        self.items.get(item).map(|i| i.unit)
    }

    /// Add a batch, converting it into the item's canonical unit.
    pub fn restock(&mut self, mut batch: StockBatch) -> DomainResult<()> {
        batch.validate()?;

        let entry = self
            .items
            .entry(batch.item.clone())
            .or_insert_with(|| StockItem::new(batch.item.clone(), batch.unit));

        if batch.unit != entry.unit {
            let factor = self.units.convert(1.0, batch.unit, entry.unit)?;
            batch.quantity *= factor;
            batch.price_per_unit = batch.price_per_unit.map(|price| price / factor);
            batch.unit = entry.unit;
        }

        entry.insert(batch);
        Ok(())
    }

    pub fn snapshot(&self) -> StockSnapshot {
        StockSnapshot {
            items: self.items.values().cloned().collect(),
        }
    }

    /// Quantities usable on `date` assuming no consumption happens before it.
    ///
    /// Batches whose expiry is before `date` are excluded; a batch expiring on
    /// `date` is included. Every known item appears, possibly with zero.
    pub fn project(&self, date: NaiveDate) -> BTreeMap<ItemId, Quantity> {
        self.items
            .iter()
            .map(|(id, item)| (id.clone(), item.usable_on(date)))
            .collect()
    }

    /// Record consumption of `quantity` of `item` on `on`, oldest usable batches first.
    ///
    /// Only batches already acquired on `on` are drawn from. Refuses to take
    /// more than is available on that date; the ledger is left
    /// untouched on error. Emptied batches are removed from the view.
    pub fn deplete(
        &mut self,
        item: &ItemId,
        quantity: Quantity,
        on: NaiveDate,
    ) -> DomainResult<Vec<BatchDraw>> {
        quantity.validate()?;
        let stock = self.items.get_mut(item).ok_or_else(DomainError::not_found)?;
        let wanted = self.units.convert(quantity.amount, quantity.unit, stock.unit)?;

        let available = stock.available_on(on).amount;
        if wanted > available + QUANTITY_EPSILON {
            return Err(DomainError::invariant(format!(
                "stock cannot go negative: {item} has {} available on {on}, {} requested",
                Quantity::new(available, stock.unit),
                Quantity::new(wanted, stock.unit),
            )));
        }

        let unit = stock.unit;
        let mut outstanding = wanted;
        let mut draws = Vec::new();
        for batch in stock.batches.iter_mut().filter(|b| b.is_available_on(on)) {
            if outstanding <= QUANTITY_EPSILON {
                break;
            }
            let taken = outstanding.min(batch.quantity);
            if taken <= QUANTITY_EPSILON {
                continue;
            }
            batch.quantity = (batch.quantity - taken).max(0.0);
            outstanding -= taken;
            draws.push(BatchDraw {
                batch: batch.id,
                taken: Quantity::new(taken, unit),
                remaining: Quantity::new(batch.quantity, unit),
                version: batch.version,
            });
        }
        stock.batches.retain(|b| b.quantity > QUANTITY_EPSILON);

        tracing::debug!(%item, %on, draws = draws.len(), "depleted stock");
        Ok(draws)
    }
}
