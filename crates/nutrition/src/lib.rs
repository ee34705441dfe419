//! Nutrient totals for ingredient lists.
//!
//! Nutrient data is consumed, never sourced: callers inject a
//! [`NutrientLookup`] and the aggregator sums what it can resolve. Lookups are
//! best-effort; an ingredient that cannot be resolved is reported, not fatal.

pub mod aggregator;
pub mod lookup;
pub mod vector;

pub use aggregator::{NutrientAggregator, NutrientReport, UnresolvedIngredient, UnresolvedReason};
pub use lookup::{NutrientLookup, NutrientProfile};
pub use vector::{NutrientDeviation, NutrientRange, NutrientVector};
