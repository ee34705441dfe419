//! In-process nutrient table.

use std::collections::HashMap;

use larder_core::{ItemId, Quantity, Unit};
use larder_nutrition::{NutrientLookup, NutrientProfile, NutrientVector};

/// Nutrient lookup backed by a fixed in-process table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNutrientTable {
    profiles: HashMap<ItemId, NutrientProfile>,
}

impl InMemoryNutrientTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small table of everyday ingredients, per 100 g or 100 ml.
    pub fn with_common_ingredients() -> Self {
        let per_100 = |unit, calories, protein, carbohydrates, fat| {
            NutrientProfile::new(
                Quantity::new(100.0, unit),
                NutrientVector::new()
                    .with("calories", calories)
                    .with("protein", protein)
                    .with("carbohydrates", carbohydrates)
                    .with("fat", fat),
            )
        };

        Self::new()
            .with("oats", per_100(Unit::Gram, 389.0, 16.9, 66.3, 6.9))
            .with("milk", per_100(Unit::Milliliter, 42.0, 3.4, 5.0, 1.0))
            .with("banana", per_100(Unit::Gram, 89.0, 1.1, 22.8, 0.3))
            .with("chicken breast", per_100(Unit::Gram, 165.0, 31.0, 0.0, 3.6))
            .with("lettuce", per_100(Unit::Gram, 15.0, 1.4, 2.9, 0.1))
            .with("pasta", per_100(Unit::Gram, 131.0, 5.0, 25.0, 1.1))
    }

    pub fn with(mut self, ingredient: impl AsRef<str>, profile: NutrientProfile) -> Self {
        self.insert(ItemId::new(ingredient), profile);
        self
    }

    pub fn insert(&mut self, ingredient: ItemId, profile: NutrientProfile) {
        self.profiles.insert(ingredient, profile);
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl NutrientLookup for InMemoryNutrientTable {
    fn lookup_nutrients(&self, ingredient: &ItemId) -> Option<NutrientProfile> {
        self.profiles.get(ingredient).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::UnitTable;
    use larder_nutrition::NutrientAggregator;

    #[test]
    fn common_table_resolves_by_normalised_name() {
        let table = InMemoryNutrientTable::with_common_ingredients();
        assert_eq!(table.len(), 6);
        let chicken = table.lookup_nutrients(&ItemId::new("Chicken Breast")).unwrap();
        assert_eq!(chicken.nutrients.get("protein"), 31.0);
        assert!(table.lookup_nutrients(&ItemId::new("saffron")).is_none());
    }

    #[test]
    fn feeds_the_aggregator() {
        let aggregator =
            NutrientAggregator::new(InMemoryNutrientTable::with_common_ingredients(), UnitTable::default());
        let oats = ItemId::new("oats");
        let milk = ItemId::new("milk");
        let report = aggregator.aggregate([
            (&oats, Quantity::new(50.0, Unit::Gram)),
            (&milk, Quantity::new(1.0, Unit::Cup)),
        ]);
        assert!(report.is_complete());
        assert!((report.totals.get("calories") - (194.5 + 100.8)).abs() < 1e-9);
    }
}
