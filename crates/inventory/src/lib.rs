//! Household stock domain module.
//!
//! This crate contains the stock ledger, expiry classification and stock
//! analytics, implemented purely as deterministic domain logic (no IO, no
//! HTTP, no storage).

pub mod analytics;
pub mod batch;
pub mod expiry;
pub mod ledger;

pub use analytics::{
    ExpiryAction, LowStockLevel, Recommendation, RestockPolicy, StockSummary, UNCATEGORIZED,
    low_stock_levels, recommend, summarize,
};
pub use batch::{BatchSource, StockBatch};
pub use expiry::{BatchClassification, ExpiryMonitor, ExpiryWindows, Freshness};
pub use ledger::{BatchDraw, StockItem, StockLedger, StockSnapshot};
