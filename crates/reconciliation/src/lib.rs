//! Reconciliation of projected stock against meal plan requirements.
//!
//! A run walks a date range day by day, consuming stock FIFO by expiry,
//! records shortages, merges them with expiry and low-stock signals into a
//! deduplicated alert list, and turns shortage alerts into a shopping list.
//!
//! Everything here is deterministic and does no I/O. Loading inputs and
//! publishing outputs is the collaborator layer's job (`larder-infra`).

pub mod alerts;
pub mod config;
pub mod engine;
pub mod run;
pub mod shopping;

pub use alerts::{Alert, AlertEngine, AlertKind};
pub use config::ReconcileConfig;
pub use engine::{ConsumptionRecord, Reconciliation, ReconciliationEngine, ShortageRecord};
pub use run::{Reconciler, RunReport, RunWarning};
pub use shopping::{ShoppingListEntry, ShoppingListGenerator};
