//! Day-by-day simulation of plan consumption against projected stock.
//!
//! The engine works on a run-local copy of the ledger: on each date the
//! quantity available for an item is what `project(date)` would report minus
//! everything the simulation already consumed, restricted to batches acquired
//! on or before that date. Consumption goes through [`StockLedger::deplete`],
//! so batches are drawn FIFO by expiry and expired batches are never touched.
//!
//! Dates are processed strictly in ascending order and every item of a date is
//! resolved before moving on; nothing borrows from later dates or from
//! restocks that have not arrived yet.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use larder_core::{BatchId, DateRange, DomainResult, ItemId, QUANTITY_EPSILON, Quantity, Unit};
use larder_inventory::StockLedger;

/// Uncovered demand for one item on one date. Only emitted when positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortageRecord {
    pub date: NaiveDate,
    pub item: ItemId,
    pub shortage: Quantity,
    pub required: Quantity,
    pub available: Quantity,
}

/// Quantity the simulation drew from one batch on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    pub date: NaiveDate,
    pub item: ItemId,
    pub batch: BatchId,
    pub taken: Quantity,
}

/// Result of one reconciliation walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub range: DateRange,
    /// Ordered by date, then item.
    pub shortages: Vec<ShortageRecord>,
    /// Every simulated draw, in the order it happened.
    pub consumption: Vec<ConsumptionRecord>,
}

impl Reconciliation {
    pub fn has_shortages(&self) -> bool {
        !self.shortages.is_empty()
    }
}

type DailyDemand = BTreeMap<NaiveDate, BTreeMap<ItemId, Quantity>>;

#[derive(Debug, Clone, Copy)]
pub struct ReconciliationEngine<'a> {
    ledger: &'a StockLedger,
}

impl<'a> ReconciliationEngine<'a> {
    pub fn new(ledger: &'a StockLedger) -> Self {
        Self { ledger }
    }

    /// Simulate `requirements` over `range`.
    ///
    /// Requirements dated outside `range` are ignored. Amounts for the same
    /// item are converted into the ledger's unit for that item (or the first
    /// requirement's unit for items the ledger has never seen); an
    /// incompatible unit fails the whole run with `UnitMismatch`.
    pub fn run<'r>(
        &self,
        range: DateRange,
        requirements: impl IntoIterator<Item = (NaiveDate, &'r ItemId, Quantity)>,
    ) -> DomainResult<Reconciliation> {
        let demand = self.daily_demand(range, requirements)?;
        let mut stock = self.ledger.clone();
        let mut shortages = Vec::new();
        let mut consumption = Vec::new();

        for date in range.days() {
            let Some(day) = demand.get(&date) else {
                continue;
            };

            for (item, required) in day {
                let available = stock
                    .item(item)
                    .map(|s| s.available_on(date).amount)
                    .unwrap_or(0.0);

                let take = required.amount.min(available);
                if take > QUANTITY_EPSILON {
                    let draws = stock.deplete(item, Quantity::new(take, required.unit), date)?;
                    consumption.extend(draws.into_iter().map(|draw| ConsumptionRecord {
                        date,
                        item: item.clone(),
                        batch: draw.batch,
                        taken: draw.taken,
                    }));
                }

                let shortage = required.amount - available;
                if shortage > QUANTITY_EPSILON {
                    shortages.push(ShortageRecord {
                        date,
                        item: item.clone(),
                        shortage: Quantity::new(shortage, required.unit),
                        required: *required,
                        available: Quantity::new(available, required.unit),
                    });
                }
            }

            tracing::debug!(%date, items = day.len(), shortages = shortages.len(), "simulated day");
        }

        Ok(Reconciliation {
            range,
            shortages,
            consumption,
        })
    }

    fn daily_demand<'r>(
        &self,
        range: DateRange,
        requirements: impl IntoIterator<Item = (NaiveDate, &'r ItemId, Quantity)>,
    ) -> DomainResult<DailyDemand> {
        let units = self.ledger.units();
        let mut unseen_units: BTreeMap<&'r ItemId, Unit> = BTreeMap::new();
        let mut demand = DailyDemand::new();

        for (date, item, quantity) in requirements {
            if !range.contains(date) {
                continue;
            }
            quantity.validate()?;

            let unit = match self.ledger.unit_of(item) {
                Some(unit) => unit,
                None => *unseen_units.entry(item).or_insert(quantity.unit),
            };
            let amount = units.convert(quantity.amount, quantity.unit, unit)?;

            demand
                .entry(date)
                .or_default()
                .entry(item.clone())
                .or_insert_with(|| Quantity::zero(unit))
                .amount += amount;
        }
        Ok(demand)
    }
}
