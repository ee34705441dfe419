//! Freshness classification and spoilage risk for stock batches.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use larder_core::{BatchId, DomainError, DomainResult, ItemId, Quantity};

use crate::batch::{StockBatch, cmp_expiry};

/// Day windows that split non-expired batches into CRITICAL / WARNING / FRESH.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpiryWindows {
    /// Expiry within `[D, D + critical_days]` is CRITICAL.
    pub critical_days: u32,
    /// Expiry within `(D + critical_days, D + warning_days]` is WARNING.
    pub warning_days: u32,
}

impl Default for ExpiryWindows {
    fn default() -> Self {
        Self {
            critical_days: 2,
            warning_days: 7,
        }
    }
}

impl ExpiryWindows {
    pub fn validate(&self) -> DomainResult<()> {
        if self.critical_days > self.warning_days {
            return Err(DomainError::validation(format!(
                "critical window ({} days) must not exceed warning window ({} days)",
                self.critical_days, self.warning_days
            )));
        }
        Ok(())
    }
}

/// Freshness bucket of a batch relative to a reference date.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Freshness {
    Expired,
    Critical,
    Warning,
    Fresh,
}

impl Freshness {
    /// CRITICAL and WARNING batches should be used soon.
    pub fn is_expiring_soon(&self) -> bool {
        matches!(self, Freshness::Critical | Freshness::Warning)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchClassification {
    pub batch: BatchId,
    pub item: ItemId,
    pub quantity: Quantity,
    pub expires_on: Option<NaiveDate>,
    pub days_until_expiry: Option<i64>,
    pub freshness: Freshness,
    /// 1.0 on the expiry day, decaying linearly to 0.0 at the warning horizon.
    /// Always 0.0 for expired and non-expiring batches.
    pub spoilage_risk: f64,
}

/// Classifies batches into freshness buckets.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ExpiryMonitor {
    windows: ExpiryWindows,
}

impl ExpiryMonitor {
    pub fn new(windows: ExpiryWindows) -> Self {
        Self { windows }
    }

    pub fn windows(&self) -> ExpiryWindows {
        self.windows
    }

    pub fn freshness(&self, expires_on: Option<NaiveDate>, reference: NaiveDate) -> Freshness {
        let Some(expires_on) = expires_on else {
            return Freshness::Fresh;
        };
        let days = (expires_on - reference).num_days();
        if days < 0 {
            Freshness::Expired
        } else if days <= i64::from(self.windows.critical_days) {
            Freshness::Critical
        } else if days <= i64::from(self.windows.warning_days) {
            Freshness::Warning
        } else {
            Freshness::Fresh
        }
    }

    pub fn spoilage_risk(&self, expires_on: Option<NaiveDate>, reference: NaiveDate) -> f64 {
        let Some(expires_on) = expires_on else {
            return 0.0;
        };
        let days = (expires_on - reference).num_days();
        if days < 0 {
            return 0.0;
        }
        let horizon = f64::from(self.windows.warning_days);
        if horizon <= 0.0 {
            return if days == 0 { 1.0 } else { 0.0 };
        }
        (1.0 - days as f64 / horizon).clamp(0.0, 1.0)
    }

    pub fn classify_batch(&self, batch: &StockBatch, reference: NaiveDate) -> BatchClassification {
        BatchClassification {
            batch: batch.id,
            item: batch.item.clone(),
            quantity: batch.quantity(),
            expires_on: batch.expires_on,
            days_until_expiry: batch.expires_on.map(|e| (e - reference).num_days()),
            freshness: self.freshness(batch.expires_on, reference),
            spoilage_risk: self.spoilage_risk(batch.expires_on, reference),
        }
    }

    /// Classify every batch, ordered by ascending expiry (non-expiring last),
    /// ties broken by item then batch id.
    pub fn classify<'a>(
        &self,
        batches: impl IntoIterator<Item = &'a StockBatch>,
        reference: NaiveDate,
    ) -> Vec<BatchClassification> {
        let mut out: Vec<BatchClassification> = batches
            .into_iter()
            .map(|b| self.classify_batch(b, reference))
            .collect();
        out.sort_by(|a, b| {
            cmp_expiry(a.expires_on, b.expires_on)
                .then_with(|| a.item.cmp(&b.item))
                .then_with(|| a.batch.cmp(&b.batch))
        });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use larder_core::Unit;
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 10).unwrap()
    }

    fn plus(days: u64) -> NaiveDate {
        today().checked_add_days(Days::new(days)).unwrap()
    }

    fn batch(item: &str, expires_on: Option<NaiveDate>) -> StockBatch {
        let b = StockBatch::new(
            ItemId::new(item),
            Quantity::new(1.0, Unit::Piece),
            today().checked_sub_days(Days::new(30)).unwrap(),
        );
        match expires_on {
            Some(e) => b.expiring_on(e),
            None => b,
        }
    }

    #[test]
    fn bucket_boundaries() {
        let m = ExpiryMonitor::default();
        let yesterday = today().pred_opt().unwrap();
        assert_eq!(m.freshness(Some(yesterday), today()), Freshness::Expired);
        assert_eq!(m.freshness(Some(today()), today()), Freshness::Critical);
        assert_eq!(m.freshness(Some(plus(2)), today()), Freshness::Critical);
        assert_eq!(m.freshness(Some(plus(3)), today()), Freshness::Warning);
        assert_eq!(m.freshness(Some(plus(7)), today()), Freshness::Warning);
        assert_eq!(m.freshness(Some(plus(8)), today()), Freshness::Fresh);
        assert_eq!(m.freshness(None, today()), Freshness::Fresh);
    }

    #[test]
    fn risk_decays_linearly_towards_the_horizon() {
        let m = ExpiryMonitor::default();
        assert_eq!(m.spoilage_risk(Some(today()), today()), 1.0);
        assert!((m.spoilage_risk(Some(plus(1)), today()) - 6.0 / 7.0).abs() < 1e-12);
        assert_eq!(m.spoilage_risk(Some(plus(7)), today()), 0.0);
        assert_eq!(m.spoilage_risk(Some(plus(30)), today()), 0.0);
        assert_eq!(m.spoilage_risk(Some(today().pred_opt().unwrap()), today()), 0.0);
    }

    #[test]
    fn classification_is_sorted_by_expiry_then_item() {
        let m = ExpiryMonitor::default();
        let batches = vec![
            batch("yogurt", Some(plus(3))),
            batch("bread", None),
            batch("milk", Some(plus(1))),
            batch("eggs", Some(plus(3))),
        ];
        let out = m.classify(&batches, today());
        let items: Vec<&str> = out.iter().map(|c| c.item.as_str()).collect();
        assert_eq!(items, vec!["milk", "eggs", "yogurt", "bread"]);
    }

    #[test]
    fn inverted_windows_are_rejected() {
        let windows = ExpiryWindows {
            critical_days: 5,
            warning_days: 3,
        };
        assert!(windows.validate().is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: buckets partition all batches; each lands in exactly the bucket its
        /// distance to expiry dictates.
        #[test]
        fn buckets_are_a_total_partition(offset in -30i64..60, critical in 0u32..5, extra in 0u32..10) {
            let windows = ExpiryWindows { critical_days: critical, warning_days: critical + extra };
            let m = ExpiryMonitor::new(windows);
            let expiry = if offset >= 0 {
                today().checked_add_days(Days::new(offset as u64)).unwrap()
            } else {
                today().checked_sub_days(Days::new((-offset) as u64)).unwrap()
            };
            let f = m.freshness(Some(expiry), today());

            let memberships = [
                offset < 0,
                (0..=i64::from(critical)).contains(&offset),
                offset > i64::from(critical) && offset <= i64::from(critical + extra),
                offset > i64::from(critical + extra),
            ];
            prop_assert_eq!(memberships.iter().filter(|m| **m).count(), 1);
            let expected = match memberships.iter().position(|m| *m) {
                Some(0) => Freshness::Expired,
                Some(1) => Freshness::Critical,
                Some(2) => Freshness::Warning,
                _ => Freshness::Fresh,
            };
            prop_assert_eq!(f, expected);

            let risk = m.spoilage_risk(Some(expiry), today());
            prop_assert!((0.0..=1.0).contains(&risk));
            if offset < 0 {
                prop_assert_eq!(risk, 0.0);
            }
        }
    }
}
