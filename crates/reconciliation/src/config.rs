//! Reconciliation configuration: thresholds, purchase increments, unit table
//! and expiry windows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use larder_core::{DomainError, DomainResult, ItemId, QUANTITY_EPSILON, Quantity, UnitTable};
use larder_inventory::{ExpiryWindows, RestockPolicy};

/// Explicit configuration handed to every run.
///
/// Every field has a default, so `{}` is a valid configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Per-item usable quantity at or below which a LOW_STOCK alert fires.
    pub low_stock_thresholds: BTreeMap<ItemId, Quantity>,
    /// Pack size each shopping list quantity is rounded up to.
    pub purchase_increments: BTreeMap<ItemId, Quantity>,
    pub units: UnitTable,
    pub expiry_windows: ExpiryWindows,
    pub restock_multiplier: f64,
    pub overstock_multiplier: f64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            low_stock_thresholds: BTreeMap::new(),
            purchase_increments: BTreeMap::new(),
            units: UnitTable::default(),
            expiry_windows: ExpiryWindows::default(),
            restock_multiplier: 2.0,
            overstock_multiplier: 3.0,
        }
    }
}

impl ReconcileConfig {
    pub fn with_threshold(mut self, item: ItemId, threshold: Quantity) -> Self {
        self.low_stock_thresholds.insert(item, threshold);
        self
    }

    pub fn with_increment(mut self, item: ItemId, increment: Quantity) -> Self {
        self.purchase_increments.insert(item, increment);
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        self.units.validate()?;
        self.expiry_windows.validate()?;

        for (item, threshold) in &self.low_stock_thresholds {
            threshold
                .validate()
                .map_err(|e| DomainError::validation(format!("low stock threshold for {item}: {e}")))?;
            self.require_known_unit(item, threshold)?;
        }

        for (item, increment) in &self.purchase_increments {
            if !increment.amount.is_finite() || increment.amount <= QUANTITY_EPSILON {
                return Err(DomainError::validation(format!(
                    "purchase increment for {item} must be positive, got {increment}"
                )));
            }
            self.require_known_unit(item, increment)?;
        }

        if !(self.restock_multiplier.is_finite() && self.restock_multiplier >= 1.0) {
            return Err(DomainError::validation(format!(
                "restock_multiplier must be >= 1, got {}",
                self.restock_multiplier
            )));
        }
        if !(self.overstock_multiplier.is_finite() && self.overstock_multiplier >= 1.0) {
            return Err(DomainError::validation(format!(
                "overstock_multiplier must be >= 1, got {}",
                self.overstock_multiplier
            )));
        }
        Ok(())
    }

    fn require_known_unit(&self, item: &ItemId, quantity: &Quantity) -> DomainResult<()> {
        if self.units.factor(quantity.unit).is_none() {
            return Err(DomainError::validation(format!(
                "{item}: unit '{}' is not in the unit table",
                quantity.unit
            )));
        }
        Ok(())
    }

    pub fn restock_policy(&self) -> RestockPolicy<'_> {
        RestockPolicy {
            thresholds: &self.low_stock_thresholds,
            restock_multiplier: self.restock_multiplier,
            overstock_multiplier: self.overstock_multiplier,
        }
    }
}
