//! Recipes and the recipe book.
//!
//! Recipes come in two shapes that scale differently:
//! - [`PerServingRecipe`]: quantities are for one serving.
//! - [`BatchRecipe`]: quantities are for a whole batch yielding `yields` servings.
//!
//! Both expose the same capability through [`IngredientSource`]: expand to an
//! ingredient list for a number of servings.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use larder_core::{DomainError, DomainResult, ItemId, Quantity, RecipeId, Unit};

/// One ingredient of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub ingredient: ItemId,
    pub quantity: f64,
    pub unit: Unit,
    /// Dietary tags ("dairy", "meat", "gluten", ...), lowercase.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl IngredientLine {
    pub fn new(ingredient: ItemId, quantity: Quantity) -> Self {
        Self {
            ingredient,
            quantity: quantity.amount,
            unit: quantity.unit,
            tags: BTreeSet::new(),
        }
    }

    pub fn tagged(mut self, tag: impl AsRef<str>) -> Self {
        self.tags.insert(tag.as_ref().trim().to_lowercase());
        self
    }

    pub fn quantity(&self) -> Quantity {
        Quantity::new(self.quantity, self.unit)
    }

    fn scaled(&self, factor: f64) -> IngredientLine {
        IngredientLine {
            quantity: self.quantity * factor,
            ..self.clone()
        }
    }
}

/// Capability shared by every recipe variant.
pub trait IngredientSource {
    fn id(&self) -> &RecipeId;

    fn ingredients(&self) -> &[IngredientLine];

    /// Recipe-level dietary tags.
    fn tags(&self) -> &BTreeSet<String>;

    /// Multiplier applied to `ingredients()` to feed `servings`.
    fn scale_for(&self, servings: u32) -> f64;

    /// Ingredient list scaled for `servings`, in recipe order.
    fn expand(&self, servings: u32) -> Vec<IngredientLine> {
        let factor = self.scale_for(servings);
        self.ingredients().iter().map(|l| l.scaled(factor)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerServingRecipe {
    pub id: RecipeId,
    pub ingredients: Vec<IngredientLine>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl IngredientSource for PerServingRecipe {
    fn id(&self) -> &RecipeId {
        &self.id
    }

    fn ingredients(&self) -> &[IngredientLine] {
        &self.ingredients
    }

    fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    fn scale_for(&self, servings: u32) -> f64 {
        f64::from(servings)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecipe {
    pub id: RecipeId,
    /// Servings one batch produces.
    pub yields: u32,
    pub ingredients: Vec<IngredientLine>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl IngredientSource for BatchRecipe {
    fn id(&self) -> &RecipeId {
        &self.id
    }

    fn ingredients(&self) -> &[IngredientLine] {
        &self.ingredients
    }

    fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    fn scale_for(&self, servings: u32) -> f64 {
        if self.yields == 0 {
            return 0.0;
        }
        f64::from(servings) / f64::from(self.yields)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recipe {
    PerServing(PerServingRecipe),
    Batch(BatchRecipe),
}

impl Recipe {
    pub fn per_serving(id: RecipeId, ingredients: Vec<IngredientLine>) -> Self {
        Recipe::PerServing(PerServingRecipe {
            id,
            ingredients,
            tags: BTreeSet::new(),
        })
    }

    pub fn batch(id: RecipeId, yields: u32, ingredients: Vec<IngredientLine>) -> Self {
        Recipe::Batch(BatchRecipe {
            id,
            yields,
            ingredients,
            tags: BTreeSet::new(),
        })
    }

    fn source(&self) -> &dyn IngredientSource {
        match self {
            Recipe::PerServing(r) => r,
            Recipe::Batch(r) => r,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if let Recipe::Batch(b) = self {
            if b.yields == 0 {
                return Err(DomainError::validation(format!(
                    "recipe {}: batch must yield at least one serving",
                    b.id
                )));
            }
        }
        for line in self.ingredients() {
            line.quantity().validate().map_err(|e| {
                DomainError::validation(format!("recipe {}: {}: {e}", self.id(), line.ingredient))
            })?;
        }
        Ok(())
    }
}

impl IngredientSource for Recipe {
    fn id(&self) -> &RecipeId {
        self.source().id()
    }

    fn ingredients(&self) -> &[IngredientLine] {
        self.source().ingredients()
    }

    fn tags(&self) -> &BTreeSet<String> {
        self.source().tags()
    }

    fn scale_for(&self, servings: u32) -> f64 {
        self.source().scale_for(servings)
    }
}

/// Recipes available to a planner, keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeBook {
    recipes: BTreeMap<RecipeId, Recipe>,
}

impl RecipeBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book, rejecting invalid recipes and duplicate ids.
    pub fn from_recipes(recipes: impl IntoIterator<Item = Recipe>) -> DomainResult<Self> {
        let mut book = Self::new();
        for recipe in recipes {
            book.insert(recipe)?;
        }
        Ok(book)
    }

    pub fn insert(&mut self, recipe: Recipe) -> DomainResult<()> {
        recipe.validate()?;
        let id = recipe.id().clone();
        if self.recipes.contains_key(&id) {
            return Err(DomainError::validation(format!("duplicate recipe id '{id}'")));
        }
        self.recipes.insert(id, recipe);
        Ok(())
    }

    pub fn get(&self, id: &RecipeId) -> Option<&Recipe> {
        self.recipes.get(id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}
