//! Meal planning domain module.
//!
//! Recipes, meal plans and dietary profiles, plus the planner that expands a
//! plan into dated ingredient requirements. Pure and deterministic; plans are
//! authored elsewhere and are read-only here.

pub mod dietary;
pub mod plan;
pub mod planner;
pub mod recipe;

pub use dietary::{DietaryOffense, DietaryProfile, DietaryViolation};
pub use plan::{MealEntry, MealPlan, MealSlot};
pub use planner::{
    DailyNutrition, EntryRejection, EntryRequirements, ExpandedPlan, Expansion, MealPlanner,
    Requirement,
};
pub use recipe::{BatchRecipe, IngredientLine, IngredientSource, PerServingRecipe, Recipe, RecipeBook};
