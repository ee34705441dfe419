//! Dietary profiles: exclusion sets and nutrient targets.
//!
//! A profile never rejects a whole plan; it reports offending entries and the
//! planner skips them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};

use larder_core::{ItemId, RecipeId};
use larder_nutrition::NutrientRange;

use crate::plan::MealEntry;
use crate::recipe::IngredientSource;

/// Exclusions and nutrient targets for the people a plan feeds.
///
/// A restriction matches an ingredient identifier or any tag on the ingredient
/// or recipe, case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DietaryProfile {
    #[serde(default, deserialize_with = "normalized_set")]
    restrictions: BTreeSet<String>,
    #[serde(default)]
    nutrient_targets: BTreeMap<String, NutrientRange>,
}

impl DietaryProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vegetarian() -> Self {
        Self::new().excluding("meat").excluding("poultry").excluding("fish")
    }

    pub fn vegan() -> Self {
        Self::vegetarian().excluding("dairy").excluding("eggs")
    }

    pub fn excluding(mut self, restriction: impl AsRef<str>) -> Self {
        self.restrictions.insert(normalize(restriction.as_ref()));
        self
    }

    pub fn with_target(mut self, nutrient: impl Into<String>, range: NutrientRange) -> Self {
        self.nutrient_targets.insert(nutrient.into(), range);
        self
    }

    pub fn restrictions(&self) -> impl Iterator<Item = &str> {
        self.restrictions.iter().map(String::as_str)
    }

    pub fn nutrient_targets(&self) -> &BTreeMap<String, NutrientRange> {
        &self.nutrient_targets
    }

    fn restricted(&self, candidate: &str) -> Option<String> {
        let candidate = normalize(candidate);
        self.restrictions.contains(&candidate).then_some(candidate)
    }

    /// Everything in `recipe` this profile excludes (empty when compatible).
    pub fn offenses(&self, recipe: &dyn IngredientSource) -> Vec<DietaryOffense> {
        if self.restrictions.is_empty() {
            return Vec::new();
        }

        let mut out: Vec<DietaryOffense> = recipe
            .tags()
            .iter()
            .filter_map(|tag| self.restricted(tag))
            .map(|restriction| DietaryOffense {
                ingredient: None,
                restriction,
            })
            .collect();

        for line in recipe.ingredients() {
            let by_id = self.restricted(line.ingredient.as_str());
            let by_tag = line.tags.iter().filter_map(|t| self.restricted(t));
            for restriction in by_id.into_iter().chain(by_tag) {
                out.push(DietaryOffense {
                    ingredient: Some(line.ingredient.clone()),
                    restriction,
                });
            }
        }
        out
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

fn normalized_set<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeSet<String>, D::Error> {
    let raw = BTreeSet::<String>::deserialize(deserializer)?;
    Ok(raw.iter().map(|s| normalize(s)).collect())
}

/// One reason a recipe breaks the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietaryOffense {
    /// `None` when a recipe-level tag matched.
    pub ingredient: Option<ItemId>,
    pub restriction: String,
}

/// Non-fatal: a plan entry whose recipe the profile excludes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietaryViolation {
    pub entry: MealEntry,
    pub recipe: RecipeId,
    pub offenses: Vec<DietaryOffense>,
}
