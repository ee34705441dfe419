//! One full reconciliation run, from stock and plan to report.

use chrono::NaiveDate;
use serde::Serialize;

use larder_core::{DateRange, DomainResult, ItemId};
use larder_inventory::{
    BatchClassification, ExpiryMonitor, Recommendation, StockLedger, StockSummary,
    low_stock_levels, recommend, summarize,
};
use larder_nutrition::{NutrientAggregator, NutrientDeviation, NutrientLookup, UnresolvedIngredient};
use larder_planning::{
    DailyNutrition, DietaryProfile, DietaryViolation, EntryRejection, MealEntry, MealPlan,
    MealPlanner, RecipeBook,
};

use crate::alerts::{Alert, AlertEngine};
use crate::config::ReconcileConfig;
use crate::engine::{ReconciliationEngine, ShortageRecord};
use crate::shopping::{ShoppingListEntry, ShoppingListGenerator};

/// Non-fatal problem collected during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunWarning {
    DietaryViolation(DietaryViolation),
    UnknownRecipe {
        entry: MealEntry,
    },
    UnresolvedIngredient {
        date: NaiveDate,
        unresolved: UnresolvedIngredient,
    },
    NutrientDeviation {
        date: NaiveDate,
        deviation: NutrientDeviation,
    },
}

impl From<EntryRejection> for RunWarning {
    fn from(rejection: EntryRejection) -> Self {
        match rejection {
            EntryRejection::Dietary(violation) => RunWarning::DietaryViolation(violation),
            EntryRejection::UnknownRecipe { entry } => RunWarning::UnknownRecipe { entry },
        }
    }
}

/// Everything a run produces. Deterministic for identical inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub range: DateRange,
    pub reference_date: NaiveDate,
    pub shortages: Vec<ShortageRecord>,
    pub alerts: Vec<Alert>,
    pub shopping_list: Vec<ShoppingListEntry>,
    pub classifications: Vec<BatchClassification>,
    pub summary: StockSummary,
    pub recommendations: Vec<Recommendation>,
    pub nutrition: Vec<DailyNutrition>,
    pub warnings: Vec<RunWarning>,
}

impl RunReport {
    pub fn shortages_for<'a>(&'a self, item: &'a ItemId) -> impl Iterator<Item = &'a ShortageRecord> {
        self.shortages.iter().filter(move |s| &s.item == item)
    }
}

/// Runs reconciliations with fixed configuration, recipes, profile and nutrient data.
///
/// The ledger is expected to use `config.units`.
#[derive(Debug, Clone)]
pub struct Reconciler<'a, L> {
    config: &'a ReconcileConfig,
    recipes: &'a RecipeBook,
    profile: &'a DietaryProfile,
    nutrients: L,
}

impl<'a, L: NutrientLookup> Reconciler<'a, L> {
    pub fn new(
        config: &'a ReconcileConfig,
        recipes: &'a RecipeBook,
        profile: &'a DietaryProfile,
        nutrients: L,
    ) -> Self {
        Self {
            config,
            recipes,
            profile,
            nutrients,
        }
    }

    /// Reconcile `plan` against `ledger` over `range`, with `reference_date` as "today".
    ///
    /// Fails only on invalid configuration or a unit mismatch; dietary
    /// violations, unknown recipes and nutrition gaps become warnings.
    pub fn run(
        &self,
        ledger: &StockLedger,
        plan: &MealPlan,
        range: DateRange,
        reference_date: NaiveDate,
    ) -> DomainResult<RunReport> {
        let config = self.config;
        config.validate()?;
        tracing::info!(%range, %reference_date, entries = plan.entries().len(), "reconciliation run started");

        let planner = MealPlanner::new(self.recipes, self.profile);
        let expanded = planner.expand_range(plan, range).collect_all();

        let reconciliation = ReconciliationEngine::new(ledger).run(range, expanded.triples())?;

        let classifications = ExpiryMonitor::new(config.expiry_windows).classify(ledger.batches(), reference_date);
        let low_stock = low_stock_levels(ledger, &config.low_stock_thresholds, reference_date)?;

        let alerts = AlertEngine::new(reference_date).evaluate(
            &classifications,
            &reconciliation.shortages,
            &low_stock,
        )?;
        let shopping_list =
            ShoppingListGenerator::new(&config.purchase_increments, &config.units).generate(&alerts)?;

        let summary = summarize(ledger, &classifications, &config.low_stock_thresholds, reference_date)?;
        let recommendations = recommend(ledger, &classifications, config.restock_policy(), reference_date)?;

        let aggregator = NutrientAggregator::new(&self.nutrients, config.units.clone());
        let nutrition = planner.daily_nutrition(&expanded, &aggregator);

        let mut warnings: Vec<RunWarning> = expanded.rejections.into_iter().map(RunWarning::from).collect();
        for day in &nutrition {
            warnings.extend(day.report.unresolved.iter().map(|u| RunWarning::UnresolvedIngredient {
                date: day.date,
                unresolved: u.clone(),
            }));
            warnings.extend(day.deviations.iter().map(|d| RunWarning::NutrientDeviation {
                date: day.date,
                deviation: d.clone(),
            }));
        }
        if !warnings.is_empty() {
            tracing::warn!(warnings = warnings.len(), "reconciliation run produced warnings");
        }

        tracing::info!(
            shortages = reconciliation.shortages.len(),
            alerts = alerts.len(),
            shopping_list = shopping_list.len(),
            "reconciliation run finished"
        );

        Ok(RunReport {
            range,
            reference_date,
            shortages: reconciliation.shortages,
            alerts,
            shopping_list,
            classifications,
            summary,
            recommendations,
            nutrition,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::{DomainError, Quantity, RecipeId, Unit, UnitTable};
    use larder_inventory::StockBatch;
    use larder_nutrition::{NutrientProfile, NutrientRange, NutrientVector};
    use larder_planning::{IngredientLine, MealSlot, Recipe};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    struct Oats;

    impl NutrientLookup for Oats {
        fn lookup_nutrients(&self, ingredient: &ItemId) -> Option<NutrientProfile> {
            (ingredient.as_str() == "oats").then(|| {
                NutrientProfile::new(
                    Quantity::new(100.0, Unit::Gram),
                    NutrientVector::new().with("protein", 16.9),
                )
            })
        }
    }

    fn recipes() -> RecipeBook {
        RecipeBook::from_recipes([
            Recipe::per_serving(
                RecipeId::new("porridge"),
                vec![
                    IngredientLine::new(ItemId::new("oats"), Quantity::new(80.0, Unit::Gram)),
                    IngredientLine::new(ItemId::new("milk"), Quantity::new(250.0, Unit::Milliliter))
                        .tagged("dairy"),
                ],
            ),
            Recipe::per_serving(
                RecipeId::new("oat bars"),
                vec![IngredientLine::new(ItemId::new("oats"), Quantity::new(60.0, Unit::Gram))],
            ),
        ])
        .unwrap()
    }

    fn plan() -> MealPlan {
        MealPlan::new(vec![
            MealEntry::new(d(2), MealSlot::Breakfast, RecipeId::new("porridge"), 1),
            MealEntry::new(d(2), MealSlot::Snack, RecipeId::new("oat bars"), 1),
            MealEntry::new(d(3), MealSlot::Breakfast, RecipeId::new("waffles"), 1),
        ])
        .unwrap()
    }

    #[test]
    fn collects_every_kind_of_warning_without_failing() {
        let config = ReconcileConfig::default();
        let recipes = recipes();
        let profile = DietaryProfile::vegan().with_target("protein", NutrientRange::at_least(50.0));
        let ledger = StockLedger::from_batches(
            [StockBatch::new(ItemId::new("oats"), Quantity::new(1.0, Unit::Kilogram), d(1))],
            UnitTable::default(),
        )
        .unwrap();

        let report = Reconciler::new(&config, &recipes, &profile, Oats)
            .run(&ledger, &plan(), DateRange::new(d(1), d(7)).unwrap(), d(1))
            .unwrap();

        assert!(report.shortages.is_empty());
        assert!(report.alerts.is_empty());
        assert!(matches!(report.warnings[0], RunWarning::DietaryViolation(_)));
        assert!(matches!(report.warnings[1], RunWarning::UnknownRecipe { .. }));
        assert!(matches!(report.warnings[2], RunWarning::NutrientDeviation { date, .. } if date == d(2)));
        assert_eq!(report.warnings.len(), 3);
        assert_eq!(report.nutrition.len(), 1);
    }

    #[test]
    fn invalid_configuration_is_fatal() {
        let config = ReconcileConfig {
            restock_multiplier: 0.0,
            ..ReconcileConfig::default()
        };
        let recipes = recipes();
        let profile = DietaryProfile::new();
        let err = Reconciler::new(&config, &recipes, &profile, Oats)
            .run(&StockLedger::default(), &plan(), DateRange::new(d(1), d(2)).unwrap(), d(1))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn report_serializes_warnings_with_a_kind_tag() {
        let config = ReconcileConfig::default();
        let recipes = recipes();
        let profile = DietaryProfile::new();
        let report = Reconciler::new(&config, &recipes, &profile, Oats)
            .run(&StockLedger::default(), &plan(), DateRange::new(d(3), d(3)).unwrap(), d(1))
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["warnings"][0]["kind"], "unknown_recipe");
        assert_eq!(json["range"]["start"], "2025-01-03");
    }
}
