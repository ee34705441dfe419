//! Infrastructure layer: collaborator contracts, in-memory adapters, config
//! loading and the orchestrating service.

pub mod config;
pub mod nutrients;
pub mod plan_source;
pub mod service;
pub mod sinks;
pub mod stock_store;


pub use nutrients::InMemoryNutrientTable;
pub use plan_source::{InMemoryPlanSource, PlanSource, PlanSourceError};
pub use service::{Collaborators, ReconciliationService, RunRequest, ServiceError};
pub use sinks::{
    AlertSink, InMemoryAlertSink, InMemoryShoppingListSink, ShoppingListSink, TracingSink,
};
pub use stock_store::{InMemoryStockStore, StockStore, StockStoreError, StockWrite};
