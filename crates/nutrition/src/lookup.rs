//! Nutrient lookup collaborator contract.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use larder_core::{ItemId, Quantity};

use crate::vector::NutrientVector;

/// Nutrient content of an ingredient per reference amount (e.g. per 100 g).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientProfile {
    pub reference: Quantity,
    pub nutrients: NutrientVector,
}

impl NutrientProfile {
    pub fn new(reference: Quantity, nutrients: NutrientVector) -> Self {
        Self { reference, nutrients }
    }
}

/// External nutrient data source.
///
/// Calls are synchronous; latency and failures are the implementor's concern.
/// `None` means the ingredient is unknown.
pub trait NutrientLookup: Send + Sync {
    fn lookup_nutrients(&self, ingredient: &ItemId) -> Option<NutrientProfile>;
}

impl<L> NutrientLookup for Arc<L>
where
    L: NutrientLookup + ?Sized,
{
    fn lookup_nutrients(&self, ingredient: &ItemId) -> Option<NutrientProfile> {
        (**self).lookup_nutrients(ingredient)
    }
}

impl<L> NutrientLookup for &L
where
    L: NutrientLookup + ?Sized,
{
    fn lookup_nutrients(&self, ingredient: &ItemId) -> Option<NutrientProfile> {
        (**self).lookup_nutrients(ingredient)
    }
}
