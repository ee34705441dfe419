//! Shopping list generation from forecast shortages.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use larder_core::{DomainResult, ItemId, QUANTITY_EPSILON, Quantity, UnitTable};

use crate::alerts::{Alert, AlertKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListEntry {
    pub item: ItemId,
    /// Amount to buy, rounded up to the purchase increment when one is configured.
    pub quantity: Quantity,
    /// Exact uncovered amount summed across dates.
    pub shortfall: Quantity,
    pub needed_by: NaiveDate,
}

/// Turns shortage alerts into a purchase list.
#[derive(Debug, Clone, Copy)]
pub struct ShoppingListGenerator<'a> {
    increments: &'a BTreeMap<ItemId, Quantity>,
    units: &'a UnitTable,
}

impl<'a> ShoppingListGenerator<'a> {
    pub fn new(increments: &'a BTreeMap<ItemId, Quantity>, units: &'a UnitTable) -> Self {
        Self { increments, units }
    }

    /// Entries for every item with a `FORECAST_SHORTAGE` alert, earliest need first.
    ///
    /// Shortfalls for the same item are summed in the unit of the first one
    /// seen, then rounded up to the item's increment. Incompatible units fail
    /// with `UnitMismatch`.
    pub fn generate(&self, alerts: &[Alert]) -> DomainResult<Vec<ShoppingListEntry>> {
        let mut needed: BTreeMap<&ItemId, (Quantity, NaiveDate)> = BTreeMap::new();

        for alert in alerts.iter().filter(|a| a.kind == AlertKind::ForecastShortage) {
            let Some(shortfall) = alert.shortfall else {
                continue;
            };
            match needed.get_mut(&alert.item) {
                Some((total, needed_by)) => {
                    total.amount += self.units.convert(shortfall.amount, shortfall.unit, total.unit)?;
                    *needed_by = (*needed_by).min(alert.date);
                }
                None => {
                    needed.insert(&alert.item, (shortfall, alert.date));
                }
            }
        }

        let mut entries = Vec::with_capacity(needed.len());
        for (item, (shortfall, needed_by)) in needed {
            if shortfall.amount <= QUANTITY_EPSILON {
                continue;
            }
            entries.push(ShoppingListEntry {
                item: item.clone(),
                quantity: self.round_up(item, shortfall)?,
                shortfall,
                needed_by,
            });
        }

        entries.sort_by(|a, b| a.needed_by.cmp(&b.needed_by).then_with(|| a.item.cmp(&b.item)));
        Ok(entries)
    }

    fn round_up(&self, item: &ItemId, shortfall: Quantity) -> DomainResult<Quantity> {
        let Some(increment) = self.increments.get(item) else {
            return Ok(shortfall);
        };
        let amount = self.units.convert(shortfall.amount, shortfall.unit, increment.unit)?;
        let packs = (amount / increment.amount - QUANTITY_EPSILON).ceil().max(1.0);
        Ok(Quantity::new(packs * increment.amount, increment.unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::{DomainError, Unit};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, day).unwrap()
    }

    fn shortage(item: &str, day: u32, amount: f64, unit: Unit) -> Alert {
        Alert {
            item: ItemId::new(item),
            kind: AlertKind::ForecastShortage,
            date: d(day),
            severity: 0.5,
            message: String::new(),
            shortfall: Some(Quantity::new(amount, unit)),
        }
    }

    #[test]
    fn rounds_up_to_pack_size_in_the_pack_unit() {
        let increments = BTreeMap::from([(ItemId::new("milk"), Quantity::new(500.0, Unit::Milliliter))]);
        let units = UnitTable::default();
        let list = ShoppingListGenerator::new(&increments, &units)
            .generate(&[shortage("milk", 3, 1.2, Unit::Liter)])
            .unwrap();
        assert_eq!(list[0].quantity, Quantity::new(1500.0, Unit::Milliliter));
        assert_eq!(list[0].shortfall, Quantity::new(1.2, Unit::Liter));
    }

    #[test]
    fn exact_multiples_are_not_bumped() {
        let increments = BTreeMap::from([(ItemId::new("eggs"), Quantity::new(6.0, Unit::Piece))]);
        let units = UnitTable::default();
        let list = ShoppingListGenerator::new(&increments, &units)
            .generate(&[shortage("eggs", 1, 1.0, Unit::Dozen)])
            .unwrap();
        assert_eq!(list[0].quantity, Quantity::new(12.0, Unit::Piece));
    }

    #[test]
    fn sums_across_dates_and_keeps_earliest_need() {
        let increments = BTreeMap::new();
        let units = UnitTable::default();
        let list = ShoppingListGenerator::new(&increments, &units)
            .generate(&[
                shortage("rice", 9, 200.0, Unit::Gram),
                shortage("rice", 4, 0.3, Unit::Kilogram),
                shortage("oats", 6, 100.0, Unit::Gram),
            ])
            .unwrap();

        let items: Vec<&str> = list.iter().map(|e| e.item.as_str()).collect();
        assert_eq!(items, vec!["rice", "oats"]);
        assert_eq!(list[0].needed_by, d(4));
        assert!((list[0].quantity.amount - 500.0).abs() < 1e-9);
        assert_eq!(list[0].quantity.unit, Unit::Gram);
    }

    #[test]
    fn ignores_other_alert_kinds() {
        let mut low = shortage("milk", 1, 1.0, Unit::Liter);
        low.kind = AlertKind::LowStock;
        let increments = BTreeMap::new();
        let units = UnitTable::default();
        let list = ShoppingListGenerator::new(&increments, &units).generate(&[low]).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn incompatible_increment_is_a_unit_mismatch() {
        let increments = BTreeMap::from([(ItemId::new("milk"), Quantity::new(1.0, Unit::Piece))]);
        let units = UnitTable::default();
        let err = ShoppingListGenerator::new(&increments, &units)
            .generate(&[shortage("milk", 1, 1.0, Unit::Liter)])
            .unwrap_err();
        assert!(matches!(err, DomainError::UnitMismatch { .. }));
    }
}
