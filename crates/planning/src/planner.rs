//! Expands meal plans into dated ingredient requirements.
//!
//! Expansion is lazy: [`Expansion`] is an iterator that does the work for one
//! plan entry per `next()`, holds no shared state and can be cloned or dropped
//! mid-way with no side effects. Entries that cannot be expanded (unknown
//! recipe, dietary violation) come out as `Err` items; the rest of the plan
//! keeps expanding.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use larder_core::{DateRange, DomainResult, ItemId, Quantity, RecipeId};
use larder_nutrition::{NutrientAggregator, NutrientDeviation, NutrientLookup, NutrientReport};

use crate::dietary::{DietaryProfile, DietaryViolation};
use crate::plan::{MealEntry, MealPlan, MealSlot};
use crate::recipe::{IngredientSource, RecipeBook};

/// One ingredient amount needed by a plan entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub ingredient: ItemId,
    pub quantity: Quantity,
}

/// Everything one meal entry needs, scaled by its serving count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRequirements {
    pub date: NaiveDate,
    pub slot: MealSlot,
    pub recipe: RecipeId,
    pub servings: u32,
    pub requirements: Vec<Requirement>,
}

/// Why a plan entry produced no requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryRejection {
    Dietary(DietaryViolation),
    UnknownRecipe { entry: MealEntry },
}

/// Lazy, restartable expansion of the plan entries inside a date range.
#[derive(Debug, Clone)]
pub struct Expansion<'a> {
    entries: std::slice::Iter<'a, MealEntry>,
    range: DateRange,
    recipes: &'a RecipeBook,
    profile: &'a DietaryProfile,
}

impl<'a> Expansion<'a> {
    fn expand_entry(&self, entry: &MealEntry) -> Result<EntryRequirements, EntryRejection> {
        let Some(recipe) = self.recipes.get(&entry.recipe) else {
            return Err(EntryRejection::UnknownRecipe {
                entry: entry.clone(),
            });
        };

        let offenses = self.profile.offenses(recipe);
        if !offenses.is_empty() {
            return Err(EntryRejection::Dietary(DietaryViolation {
                entry: entry.clone(),
                recipe: entry.recipe.clone(),
                offenses,
            }));
        }

        Ok(EntryRequirements {
            date: entry.date,
            slot: entry.slot,
            recipe: entry.recipe.clone(),
            servings: entry.servings,
            requirements: recipe
                .expand(entry.servings)
                .into_iter()
                .map(|line| Requirement {
                    quantity: line.quantity(),
                    ingredient: line.ingredient,
                })
                .collect(),
        })
    }

    /// Drain the remaining entries into accepted requirements and rejections.
    pub fn collect_all(self) -> ExpandedPlan {
        let range = self.range;
        let mut out = ExpandedPlan {
            range,
            entries: Vec::new(),
            rejections: Vec::new(),
        };
        for step in self {
            match step {
                Ok(reqs) => out.entries.push(reqs),
                Err(rejection) => out.rejections.push(rejection),
            }
        }
        out
    }
}

impl Iterator for Expansion<'_> {
    type Item = Result<EntryRequirements, EntryRejection>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = self.entries.next()?;
            if entry.date < self.range.start() {
                continue;
            }
            if entry.date > self.range.end() {
                // Entries are chronological; nothing later can be in range.
                self.entries = Default::default();
                return None;
            }
            return Some(self.expand_entry(entry));
        }
    }
}

/// Fully drained expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedPlan {
    pub range: DateRange,
    pub entries: Vec<EntryRequirements>,
    pub rejections: Vec<EntryRejection>,
}

impl ExpandedPlan {
    /// `(date, ingredient, quantity)` triples in plan order.
    pub fn triples(&self) -> impl Iterator<Item = (NaiveDate, &ItemId, Quantity)> {
        self.entries.iter().flat_map(|e| {
            e.requirements
                .iter()
                .map(move |r| (e.date, &r.ingredient, r.quantity))
        })
    }

    pub fn dietary_violations(&self) -> impl Iterator<Item = &DietaryViolation> {
        self.rejections.iter().filter_map(|r| match r {
            EntryRejection::Dietary(v) => Some(v),
            EntryRejection::UnknownRecipe { .. } => None,
        })
    }
}

/// One day's nutrient totals and their deviations from the profile's targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyNutrition {
    pub date: NaiveDate,
    pub report: NutrientReport,
    pub deviations: Vec<NutrientDeviation>,
}

/// Expands plans against a recipe book and an active dietary profile.
#[derive(Debug, Clone, Copy)]
pub struct MealPlanner<'a> {
    recipes: &'a RecipeBook,
    profile: &'a DietaryProfile,
}

impl<'a> MealPlanner<'a> {
    pub fn new(recipes: &'a RecipeBook, profile: &'a DietaryProfile) -> Self {
        Self { recipes, profile }
    }

    /// Expand the entries dated `start..=end`; `InvalidRange` if `end < start`.
    pub fn expand(
        &self,
        plan: &'a MealPlan,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<Expansion<'a>> {
        Ok(self.expand_range(plan, DateRange::new(start, end)?))
    }

    pub fn expand_range(&self, plan: &'a MealPlan, range: DateRange) -> Expansion<'a> {
        Expansion {
            entries: plan.entries().iter(),
            range,
            recipes: self.recipes,
            profile: self.profile,
        }
    }

    /// Per-day nutrient totals for an expanded plan, checked against the profile targets.
    ///
    /// Best-effort: unresolved ingredients appear in each day's report.
    pub fn daily_nutrition<L: NutrientLookup>(
        &self,
        expanded: &ExpandedPlan,
        aggregator: &NutrientAggregator<L>,
    ) -> Vec<DailyNutrition> {
        let mut by_day: BTreeMap<NaiveDate, Vec<(&ItemId, Quantity)>> = BTreeMap::new();
        for (date, ingredient, quantity) in expanded.triples() {
            by_day.entry(date).or_default().push((ingredient, quantity));
        }

        by_day
            .into_iter()
            .map(|(date, lines)| {
                let report = aggregator.aggregate(lines);
                let deviations =
                    NutrientDeviation::check_all(&report.totals, self.profile.nutrient_targets());
                if !deviations.is_empty() {
                    tracing::debug!(%date, deviations = deviations.len(), "nutrient targets missed");
                }
                DailyNutrition {
                    date,
                    report,
                    deviations,
                }
            })
            .collect()
    }
}
