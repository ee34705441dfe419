//! Versioned stock persistence boundary.
//!
//! Household-scoped batch storage with optimistic concurrency. The domain
//! never writes through this module directly: it hands back draws and batches,
//! and the service persists them with the version they were computed against.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryStockStore;
pub use r#trait::{StockStore, StockStoreError, StockWrite};
