//! Alert generation and deduplication.
//!
//! Three signal sources feed one list:
//! - expiry classifications (CRITICAL and WARNING batches) become `EXPIRING_SOON`
//! - reconciliation shortages become `FORECAST_SHORTAGE`
//! - items at or below their threshold become `LOW_STOCK`
//!
//! A run emits at most one alert per `(item, kind)`.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use larder_core::{DomainResult, ItemId, Quantity};
use larder_inventory::{BatchClassification, LowStockLevel};

use crate::engine::ShortageRecord;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    LowStock,
    ExpiringSoon,
    ForecastShortage,
}

impl core::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            AlertKind::LowStock => "LOW_STOCK",
            AlertKind::ExpiringSoon => "EXPIRING_SOON",
            AlertKind::ForecastShortage => "FORECAST_SHORTAGE",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub item: ItemId,
    pub kind: AlertKind,
    /// Date of the earliest triggering event.
    pub date: NaiveDate,
    /// Ranking score in `[0, 1]`; higher is more urgent.
    pub severity: f64,
    pub message: String,
    /// Total uncovered quantity, for `FORECAST_SHORTAGE` only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortfall: Option<Quantity>,
}

/// Builds and merges alerts relative to a reference date ("today").
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AlertEngine {
    reference: NaiveDate,
}

impl AlertEngine {
    pub fn new(reference: NaiveDate) -> Self {
        Self { reference }
    }

    /// One candidate per CRITICAL or WARNING batch, scored by spoilage risk.
    pub fn expiring_soon(&self, classifications: &[BatchClassification]) -> Vec<Alert> {
        classifications
            .iter()
            .filter(|c| c.freshness.is_expiring_soon())
            .filter_map(|c| {
                let expires_on = c.expires_on?;
                let days = c.days_until_expiry.unwrap_or_default();
                Some(Alert {
                    item: c.item.clone(),
                    kind: AlertKind::ExpiringSoon,
                    date: expires_on,
                    severity: c.spoilage_risk,
                    message: format!("{} of {} expires on {expires_on} (in {days} days)", c.quantity, c.item),
                    shortfall: None,
                })
            })
            .collect()
    }

    /// One candidate per shortage record.
    ///
    /// Severity grows with the uncovered share of the requirement and decays
    /// with distance from the reference date: `share / (1 + days_ahead)`.
    ///
    /// Magnitude is measured relative to the day's requirement, so severities
    /// stay comparable across items tracked in different units.
    pub fn forecast_shortages(&self, shortages: &[ShortageRecord]) -> Vec<Alert> {
        shortages
            .iter()
            .map(|s| {
                let share = if s.required.amount > 0.0 {
                    (s.shortage.amount / s.required.amount).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                let days_ahead = (s.date - self.reference).num_days().max(0);
                Alert {
                    item: s.item.clone(),
                    kind: AlertKind::ForecastShortage,
                    date: s.date,
                    severity: share / (1.0 + days_ahead as f64),
                    message: format!("short {} of {} on {}", s.shortage, s.item, s.date),
                    shortfall: Some(s.shortage),
                }
            })
            .collect()
    }

    /// One candidate per low item, dated at the reference date.
    pub fn low_stock(&self, levels: &[LowStockLevel]) -> Vec<Alert> {
        levels
            .iter()
            .map(|level| Alert {
                item: level.item.clone(),
                kind: AlertKind::LowStock,
                date: self.reference,
                severity: level.deficit_ratio(),
                message: format!(
                    "{} usable {} is at or below threshold {}",
                    level.item, level.usable, level.threshold
                ),
                shortfall: None,
            })
            .collect()
    }

    /// Candidates from every source, merged and ordered.
    pub fn evaluate(
        &self,
        classifications: &[BatchClassification],
        shortages: &[ShortageRecord],
        low_stock: &[LowStockLevel],
    ) -> DomainResult<Vec<Alert>> {
        let candidates = self
            .expiring_soon(classifications)
            .into_iter()
            .chain(self.forecast_shortages(shortages))
            .chain(self.low_stock(low_stock));
        merge(candidates)
    }
}

/// Collapse candidates to one alert per `(item, kind)` and order the result.
///
/// A merged alert keeps the earliest date and the highest severity, joins the
/// distinct messages in date order and sums shortfalls (`UnitMismatch` if
/// their units differ). Output is ordered by severity descending,
/// then date ascending, with item and kind as final tie-breakers.
pub fn merge(candidates: impl IntoIterator<Item = Alert>) -> DomainResult<Vec<Alert>> {
    let mut groups: BTreeMap<(ItemId, AlertKind), Vec<Alert>> = BTreeMap::new();
    for alert in candidates {
        groups
            .entry((alert.item.clone(), alert.kind))
            .or_default()
            .push(alert);
    }

    let mut merged = Vec::with_capacity(groups.len());
    for ((item, kind), mut group) in groups {
        group.sort_by(|a, b| a.date.cmp(&b.date).then(b.severity.total_cmp(&a.severity)));

        let mut messages: Vec<String> = Vec::with_capacity(group.len());
        let mut severity = f64::MIN;
        let mut shortfall: Option<Quantity> = None;
        for alert in &group {
            severity = severity.max(alert.severity);
            if !messages.contains(&alert.message) {
                messages.push(alert.message.clone());
            }
            shortfall = match (shortfall, alert.shortfall) {
                (Some(acc), Some(q)) => Some(acc.checked_add(q)?),
                (acc, q) => acc.or(q),
            };
        }

        if group.len() > 1 {
            tracing::debug!(%item, %kind, merged = group.len(), "deduplicated alerts");
        }
        merged.push(Alert {
            date: group[0].date,
            item,
            kind,
            severity,
            message: messages.join("; "),
            shortfall,
        });
    }

    merged.sort_by(|a, b| {
        b.severity
            .total_cmp(&a.severity)
            .then(a.date.cmp(&b.date))
            .then_with(|| a.item.cmp(&b.item))
            .then(a.kind.cmp(&b.kind))
    });
    Ok(merged)
}
