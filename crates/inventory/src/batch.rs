//! Stock batches: one lot of an item with its own acquisition and expiry dates.
//!
//! Batches are plain versioned values. The ledger groups them per item and the
//! stock store persists them; neither mutates a batch it did not load.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use larder_core::{BatchId, DomainError, DomainResult, ItemId, Quantity, Unit, Versioned};

/// Where a batch came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchSource {
    #[default]
    Purchase,
    Gift,
    Harvest,
    Leftover,
    Other,
}

/// A distinct lot of a stock item with its own acquisition/expiry dates.
///
/// Invariants (checked by [`StockBatch::validate`]): quantity ≥ 0 and, when
/// present, `expires_on >= acquired_on`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockBatch {
    #[serde(default)]
    pub id: BatchId,
    pub item: ItemId,
    pub quantity: f64,
    pub unit: Unit,
    pub acquired_on: NaiveDate,
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
    #[serde(default)]
    pub source: BatchSource,
    /// Free-form grouping ("dairy", "grains") used by stock analytics.
    #[serde(default)]
    pub category: Option<String>,
    /// Price of one `unit`, when known.
    #[serde(default)]
    pub price_per_unit: Option<f64>,
    /// Persistence version; bumped by the stock store on each successful write.
    #[serde(default)]
    pub version: u64,
}

impl StockBatch {
    pub fn new(item: ItemId, quantity: Quantity, acquired_on: NaiveDate) -> Self {
        Self {
            id: BatchId::new(),
            item,
            quantity: quantity.amount,
            unit: quantity.unit,
            acquired_on,
            expires_on: None,
            source: BatchSource::default(),
            category: None,
            price_per_unit: None,
            version: 0,
        }
    }

    pub fn with_id(mut self, id: BatchId) -> Self {
        self.id = id;
        self
    }

    pub fn expiring_on(mut self, expires_on: NaiveDate) -> Self {
        self.expires_on = Some(expires_on);
        self
    }

    pub fn with_source(mut self, source: BatchSource) -> Self {
        self.source = source;
        self
    }

    pub fn in_category(mut self, category: impl AsRef<str>) -> Self {
        self.category = Some(category.as_ref().trim().to_lowercase());
        self
    }

    pub fn priced_at(mut self, price_per_unit: f64) -> Self {
        self.price_per_unit = Some(price_per_unit);
        self
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn quantity(&self) -> Quantity {
        Quantity::new(self.quantity, self.unit)
    }

    /// Price of the whole batch; `None` when unpriced.
    pub fn value(&self) -> Option<f64> {
        self.price_per_unit.map(|price| price * self.quantity)
    }

    pub fn validate(&self) -> DomainResult<()> {
        self.quantity()
            .validate()
            .map_err(|e| DomainError::validation(format!("batch {}: {e}", self.id)))?;
        if let Some(expires_on) = self.expires_on {
            if expires_on < self.acquired_on {
                return Err(DomainError::validation(format!(
                    "batch {}: expiry {expires_on} precedes acquisition {}",
                    self.id, self.acquired_on
                )));
            }
        }
        if let Some(price) = self.price_per_unit {
            if !price.is_finite() || price < 0.0 {
                return Err(DomainError::validation(format!(
                    "batch {}: price per unit must be a non-negative number, got {price}",
                    self.id
                )));
            }
        }
        Ok(())
    }

    /// Usable on `date` unless it expired strictly before it (expiry day itself is usable).
    pub fn is_usable_on(&self, date: NaiveDate) -> bool {
        self.expires_on.is_none_or(|e| e >= date)
    }

    /// On hand and usable on `date`: acquired no later than it and not expired.
    pub fn is_available_on(&self, date: NaiveDate) -> bool {
        self.acquired_on <= date && self.is_usable_on(date)
    }

    /// FIFO consumption order: nearest expiry first, non-expiring last,
    /// then oldest acquisition, then id.
    pub fn fifo_cmp(&self, other: &StockBatch) -> Ordering {
        cmp_expiry(self.expires_on, other.expires_on)
            .then_with(|| self.acquired_on.cmp(&other.acquired_on))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl Versioned for StockBatch {
    fn version(&self) -> u64 {
        self.version
    }
}

/// Orders optional expiry dates with `None` (never expires) last.
pub(crate) fn cmp_expiry(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
