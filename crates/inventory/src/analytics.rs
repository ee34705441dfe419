//! Stock summary counts and restock/reduce/expiry recommendations.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use larder_core::{BatchId, DomainResult, ItemId, QUANTITY_EPSILON, Quantity};

use crate::expiry::{BatchClassification, Freshness};
use crate::ledger::StockLedger;

/// Thresholds and multipliers driving low-stock checks and recommendations.
#[derive(Debug, Clone, Copy)]
pub struct RestockPolicy<'a> {
    pub thresholds: &'a BTreeMap<ItemId, Quantity>,
    /// Restock target = threshold × this.
    pub restock_multiplier: f64,
    /// Usable stock above threshold × this is overstocked.
    pub overstock_multiplier: f64,
}

/// An item whose usable stock is at or below its configured threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowStockLevel {
    pub item: ItemId,
    pub usable: Quantity,
    pub threshold: Quantity,
}

impl LowStockLevel {
    /// Share of the threshold that is missing, in `[0, 1]`.
    pub fn deficit_ratio(&self) -> f64 {
        if self.threshold.amount <= QUANTITY_EPSILON {
            return 0.0;
        }
        ((self.threshold.amount - self.usable.amount) / self.threshold.amount).clamp(0.0, 1.0)
    }
}

/// Items at or below threshold on `on`, in item order.
///
/// Items with a threshold but no stock at all count as empty. Zero thresholds
/// never trigger.
pub fn low_stock_levels(
    ledger: &StockLedger,
    thresholds: &BTreeMap<ItemId, Quantity>,
    on: NaiveDate,
) -> DomainResult<Vec<LowStockLevel>> {
    let mut levels = Vec::new();
    for (item, threshold) in thresholds {
        if threshold.amount <= QUANTITY_EPSILON {
            continue;
        }
        let usable = match ledger.item(item) {
            Some(stock) => stock.usable_on(on).convert_to(threshold.unit, ledger.units())?,
            None => Quantity::zero(threshold.unit),
        };
        if usable.amount <= threshold.amount + QUANTITY_EPSILON {
            levels.push(LowStockLevel {
                item: item.clone(),
                usable,
                threshold: *threshold,
            });
        }
    }
    Ok(levels)
}

/// Category key for batches without one.
pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockSummary {
    pub total_items: usize,
    pub total_batches: usize,
    pub low_stock_items: usize,
    /// Items with at least one CRITICAL or WARNING batch.
    pub expiring_soon_items: usize,
    /// Items with at least one EXPIRED batch still on hand.
    pub expired_items: usize,
    /// Price × quantity over usable priced batches, rounded to cents.
    pub total_value: f64,
    /// Number of items with usable stock per category.
    pub category_distribution: BTreeMap<String, usize>,
    /// Value of usable priced batches per category, rounded to cents.
    pub value_by_category: BTreeMap<String, f64>,
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn summarize(
    ledger: &StockLedger,
    classifications: &[BatchClassification],
    thresholds: &BTreeMap<ItemId, Quantity>,
    on: NaiveDate,
) -> DomainResult<StockSummary> {
    let mut expiring: Vec<&ItemId> = classifications
        .iter()
        .filter(|c| c.freshness.is_expiring_soon())
        .map(|c| &c.item)
        .collect();
    expiring.sort();
    expiring.dedup();

    let mut expired: Vec<&ItemId> = classifications
        .iter()
        .filter(|c| c.freshness == Freshness::Expired)
        .map(|c| &c.item)
        .collect();
    expired.sort();
    expired.dedup();

    let mut total_value = 0.0;
    let mut items_by_category: BTreeMap<&str, Vec<&ItemId>> = BTreeMap::new();
    let mut value_by_category: BTreeMap<String, f64> = BTreeMap::new();
    for batch in ledger.batches().filter(|b| b.is_usable_on(on) && b.quantity > QUANTITY_EPSILON) {
        let category = batch.category.as_deref().unwrap_or(UNCATEGORIZED);
        items_by_category.entry(category).or_default().push(&batch.item);
        if let Some(value) = batch.value() {
            total_value += value;
            *value_by_category.entry(category.to_string()).or_default() += value;
        }
    }
    let category_distribution = items_by_category
        .into_iter()
        .map(|(category, mut items)| {
            items.dedup();
            (category.to_string(), items.len())
        })
        .collect();
    value_by_category.values_mut().for_each(|v| *v = round_cents(*v));

    Ok(StockSummary {
        total_items: ledger.items().count(),
        total_batches: ledger.batches().count(),
        low_stock_items: low_stock_levels(ledger, thresholds, on)?.len(),
        expiring_soon_items: expiring.len(),
        expired_items: expired.len(),
        total_value: round_cents(total_value),
        category_distribution,
        value_by_category,
    })
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryAction {
    UseSoon,
    Discard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    Restock {
        item: ItemId,
        usable: Quantity,
        recommended: Quantity,
    },
    Reduce {
        item: ItemId,
        usable: Quantity,
        recommended: Quantity,
    },
    Expiry {
        item: ItemId,
        batch: BatchId,
        days_until_expiry: i64,
        action: ExpiryAction,
    },
}

/// Restock, reduce and expiry recommendations, in that order.
pub fn recommend(
    ledger: &StockLedger,
    classifications: &[BatchClassification],
    policy: RestockPolicy<'_>,
    on: NaiveDate,
) -> DomainResult<Vec<Recommendation>> {
    let mut out = Vec::new();

    for level in low_stock_levels(ledger, policy.thresholds, on)? {
        let recommended = Quantity::new(
            level.threshold.amount * policy.restock_multiplier,
            level.threshold.unit,
        );
        out.push(Recommendation::Restock {
            item: level.item,
            usable: level.usable,
            recommended,
        });
    }

    for (item, threshold) in policy.thresholds {
        if threshold.amount <= QUANTITY_EPSILON {
            continue;
        }
        let Some(stock) = ledger.item(item) else {
            continue;
        };
        let usable = stock.usable_on(on).convert_to(threshold.unit, ledger.units())?;
        if usable.amount > threshold.amount * policy.overstock_multiplier + QUANTITY_EPSILON {
            out.push(Recommendation::Reduce {
                item: item.clone(),
                usable,
                recommended: Quantity::new(
                    threshold.amount * policy.restock_multiplier,
                    threshold.unit,
                ),
            });
        }
    }

    for c in classifications {
        let action = match c.freshness {
            Freshness::Expired => ExpiryAction::Discard,
            Freshness::Critical | Freshness::Warning => ExpiryAction::UseSoon,
            Freshness::Fresh => continue,
        };
        out.push(Recommendation::Expiry {
            item: c.item.clone(),
            batch: c.batch,
            days_until_expiry: c.days_until_expiry.unwrap_or_default(),
            action,
        });
    }

    Ok(out)
}
