//! Scenario files: a self-contained household snapshot to reconcile.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use larder_core::{DateRange, HouseholdId, ItemId, UserId};
use larder_infra::{
    Collaborators, InMemoryNutrientTable, InMemoryPlanSource, InMemoryStockStore,
    ReconciliationService, RunRequest, TracingSink,
};
use larder_inventory::StockBatch;
use larder_nutrition::NutrientProfile;
use larder_planning::{DietaryProfile, MealEntry, MealPlan, Recipe, RecipeBook};
use larder_reconciliation::{ReconcileConfig, RunReport};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub range: DateRange,
    /// Defaults to the first day of `range`.
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
    #[serde(default)]
    pub stock: Vec<StockBatch>,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    #[serde(default)]
    pub plan: Vec<MealEntry>,
    #[serde(default)]
    pub profile: DietaryProfile,
    /// Added on top of the built-in table; entries here win.
    #[serde(default)]
    pub nutrients: BTreeMap<ItemId, NutrientProfile>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("failed to parse scenario {}", path.display()))
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date.unwrap_or(self.range.start())
    }

    /// Reconcile against in-memory collaborators; alerts and the shopping
    /// list are published to the log.
    pub fn run(self, config: ReconcileConfig) -> Result<RunReport> {
        let household = HouseholdId::new();
        let user = UserId::new();
        let reference_date = self.reference_date();

        let recipes = RecipeBook::from_recipes(self.recipes).context("invalid recipe book")?;
        let plan = MealPlan::new(self.plan).context("invalid meal plan")?;

        let plans = InMemoryPlanSource::new();
        plans.insert(user, plan)?;

        let mut nutrients = InMemoryNutrientTable::with_common_ingredients();
        for (item, profile) in self.nutrients {
            nutrients.insert(item, profile);
        }

        let service = ReconciliationService::new(
            config,
            recipes,
            Collaborators {
                stock: InMemoryStockStore::with_batches(household, self.stock),
                plans,
                nutrients,
                alerts: TracingSink,
                shopping_lists: TracingSink,
            },
        )?;

        let report = service.run(&RunRequest {
            household,
            user,
            range: self.range,
            reference_date,
            profile: self.profile,
        })?;
        Ok(report)
    }
}
