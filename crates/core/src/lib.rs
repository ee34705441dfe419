//! `larder-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the stock, planning
//! and reconciliation crates (no infrastructure concerns).

pub mod date_range;
pub mod error;
pub mod id;
pub mod quantity;
pub mod value_object;
pub mod version;

pub use date_range::DateRange;
pub use error::{DomainError, DomainResult};
pub use id::{BatchId, HouseholdId, ItemId, RecipeId, UserId};
pub use quantity::{Dimension, QUANTITY_EPSILON, Quantity, Unit, UnitFactor, UnitTable};
pub use value_object::ValueObject;
pub use version::{ExpectedVersion, Versioned};
