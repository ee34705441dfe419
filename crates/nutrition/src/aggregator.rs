//! Best-effort nutrient totals over an ingredient list.

use serde::{Deserialize, Serialize};

use larder_core::{ItemId, Quantity, Unit, UnitTable};

use crate::lookup::NutrientLookup;
use crate::vector::NutrientVector;

/// Why an ingredient did not contribute to the totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// The lookup has no entry for it.
    NotFound,
    /// The requested amount cannot be expressed in the profile's reference unit.
    UnitMismatch { expected: Unit, found: Unit },
}

/// Non-fatal warning: an ingredient left out of the nutrient totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnresolvedIngredient {
    pub ingredient: ItemId,
    #[serde(flatten)]
    pub reason: UnresolvedReason,
}

/// Partial totals plus whatever could not be resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientReport {
    pub totals: NutrientVector,
    pub unresolved: Vec<UnresolvedIngredient>,
}

impl NutrientReport {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Sums nutrient vectors for ingredient amounts using an injected lookup.
#[derive(Debug, Clone)]
pub struct NutrientAggregator<L> {
    lookup: L,
    units: UnitTable,
}

impl<L: NutrientLookup> NutrientAggregator<L> {
    pub fn new(lookup: L, units: UnitTable) -> Self {
        Self { lookup, units }
    }

    /// Best-effort totals: never fails, unresolved ingredients are listed once each.
    pub fn aggregate<'a>(
        &self,
        lines: impl IntoIterator<Item = (&'a ItemId, Quantity)>,
    ) -> NutrientReport {
        let mut report = NutrientReport::default();

        for (ingredient, quantity) in lines {
            let Some(profile) = self.lookup.lookup_nutrients(ingredient) else {
                push_unresolved(&mut report, ingredient, UnresolvedReason::NotFound);
                continue;
            };

            let reference = profile.reference;
            let amount = match self.units.convert(quantity.amount, quantity.unit, reference.unit) {
                Ok(amount) => amount,
                Err(_) => {
                    push_unresolved(
                        &mut report,
                        ingredient,
                        UnresolvedReason::UnitMismatch {
                            expected: reference.unit,
                            found: quantity.unit,
                        },
                    );
                    continue;
                }
            };

            if reference.amount <= 0.0 {
                push_unresolved(&mut report, ingredient, UnresolvedReason::NotFound);
                continue;
            }
            report
                .totals
                .add_scaled(&profile.nutrients, amount / reference.amount);
        }

        if !report.unresolved.is_empty() {
            tracing::debug!(
                unresolved = report.unresolved.len(),
                "nutrient totals are partial"
            );
        }
        report
    }
}

fn push_unresolved(report: &mut NutrientReport, ingredient: &ItemId, reason: UnresolvedReason) {
    if report.unresolved.iter().any(|u| &u.ingredient == ingredient) {
        return;
    }
    report.unresolved.push(UnresolvedIngredient {
        ingredient: ingredient.clone(),
        reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::lookup::NutrientProfile;

    struct Table(HashMap<ItemId, NutrientProfile>);

    impl NutrientLookup for Table {
        fn lookup_nutrients(&self, ingredient: &ItemId) -> Option<NutrientProfile> {
            self.0.get(ingredient).cloned()
        }
    }

    fn table() -> Table {
        Table(HashMap::from([
            (
                ItemId::new("oats"),
                NutrientProfile::new(
                    Quantity::new(100.0, Unit::Gram),
                    NutrientVector::new().with("calories", 389.0).with("protein", 16.9),
                ),
            ),
            (
                ItemId::new("milk"),
                NutrientProfile::new(
                    Quantity::new(100.0, Unit::Milliliter),
                    NutrientVector::new().with("calories", 42.0).with("protein", 3.4),
                ),
            ),
        ]))
    }

    #[test]
    fn sums_with_unit_conversion() {
        let agg = NutrientAggregator::new(table(), UnitTable::default());
        let oats = ItemId::new("oats");
        let milk = ItemId::new("milk");
        let report = agg.aggregate([
            (&oats, Quantity::new(50.0, Unit::Gram)),
            (&milk, Quantity::new(0.25, Unit::Liter)),
        ]);
        assert!(report.is_complete());
        assert!((report.totals.get("calories") - (194.5 + 105.0)).abs() < 1e-9);
        assert!((report.totals.get("protein") - (8.45 + 8.5)).abs() < 1e-9);
    }

    #[test]
    fn unknown_and_mismatched_ingredients_are_reported_not_fatal() {
        let agg = NutrientAggregator::new(table(), UnitTable::default());
        let oats = ItemId::new("oats");
        let saffron = ItemId::new("saffron");
        let milk = ItemId::new("milk");
        let report = agg.aggregate([
            (&oats, Quantity::new(100.0, Unit::Gram)),
            (&saffron, Quantity::new(1.0, Unit::Gram)),
            (&saffron, Quantity::new(2.0, Unit::Gram)),
            (&milk, Quantity::new(1.0, Unit::Kilogram)),
        ]);

        assert_eq!(report.totals.get("calories"), 389.0);
        assert_eq!(
            report.unresolved,
            vec![
                UnresolvedIngredient {
                    ingredient: saffron.clone(),
                    reason: UnresolvedReason::NotFound,
                },
                UnresolvedIngredient {
                    ingredient: milk.clone(),
                    reason: UnresolvedReason::UnitMismatch {
                        expected: Unit::Milliliter,
                        found: Unit::Kilogram,
                    },
                },
            ]
        );
    }
}
