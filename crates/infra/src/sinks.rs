//! Outbound sinks for alerts and shopping lists.
//!
//! Publishing is fire-and-forget: sinks return nothing and the run never
//! waits for delivery.

use std::sync::{Arc, Mutex, PoisonError};

use larder_core::HouseholdId;
use larder_reconciliation::{Alert, ShoppingListEntry};

pub trait AlertSink: Send + Sync {
    fn publish_alerts(&self, household: HouseholdId, alerts: &[Alert]);
}

pub trait ShoppingListSink: Send + Sync {
    fn publish_shopping_list(&self, household: HouseholdId, entries: &[ShoppingListEntry]);
}

impl<S> AlertSink for Arc<S>
where
    S: AlertSink + ?Sized,
{
    fn publish_alerts(&self, household: HouseholdId, alerts: &[Alert]) {
        (**self).publish_alerts(household, alerts)
    }
}

impl<S> ShoppingListSink for Arc<S>
where
    S: ShoppingListSink + ?Sized,
{
    fn publish_shopping_list(&self, household: HouseholdId, entries: &[ShoppingListEntry]) {
        (**self).publish_shopping_list(household, entries)
    }
}

/// In-memory alert sink for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAlertSink {
    inner: Mutex<Vec<(HouseholdId, Alert)>>,
}

impl InMemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<(HouseholdId, Alert)> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl AlertSink for InMemoryAlertSink {
    fn publish_alerts(&self, household: HouseholdId, alerts: &[Alert]) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(alerts.iter().map(|a| (household, a.clone())));
    }
}

/// In-memory shopping list sink; keeps every published list.
#[derive(Debug, Default)]
pub struct InMemoryShoppingListSink {
    inner: Mutex<Vec<(HouseholdId, Vec<ShoppingListEntry>)>>,
}

impl InMemoryShoppingListSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<(HouseholdId, Vec<ShoppingListEntry>)> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// The most recently published list for `household`.
    pub fn latest(&self, household: HouseholdId) -> Option<Vec<ShoppingListEntry>> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|(h, _)| *h == household)
            .map(|(_, entries)| entries.clone())
    }
}

impl ShoppingListSink for InMemoryShoppingListSink {
    fn publish_shopping_list(&self, household: HouseholdId, entries: &[ShoppingListEntry]) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((household, entries.to_vec()));
    }
}

/// Sink that only logs; used by the CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl AlertSink for TracingSink {
    fn publish_alerts(&self, household: HouseholdId, alerts: &[Alert]) {
        for alert in alerts {
            tracing::info!(
                %household,
                item = %alert.item,
                kind = %alert.kind,
                date = %alert.date,
                severity = alert.severity,
                "{}",
                alert.message
            );
        }
    }
}

impl ShoppingListSink for TracingSink {
    fn publish_shopping_list(&self, household: HouseholdId, entries: &[ShoppingListEntry]) {
        for entry in entries {
            tracing::info!(
                %household,
                item = %entry.item,
                quantity = %entry.quantity,
                needed_by = %entry.needed_by,
                "shopping list entry"
            );
        }
    }
}
