//! Read-only meal plan source.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use larder_core::{DateRange, UserId};
use larder_planning::MealPlan;

#[derive(Debug, Error)]
pub enum PlanSourceError {
    #[error("no meal plan for user {0}")]
    NotFound(UserId),

    #[error("invalid meal plan: {0}")]
    Invalid(String),

    #[error("plan source unavailable: {0}")]
    Unavailable(String),
}

/// Where meal plans come from. Plans are authored elsewhere; this is read-only.
pub trait PlanSource: Send + Sync {
    /// The user's plan restricted to entries dated within `range`.
    fn load_meal_plan(&self, user: UserId, range: DateRange) -> Result<MealPlan, PlanSourceError>;
}

impl<P> PlanSource for Arc<P>
where
    P: PlanSource + ?Sized,
{
    fn load_meal_plan(&self, user: UserId, range: DateRange) -> Result<MealPlan, PlanSourceError> {
        (**self).load_meal_plan(user, range)
    }
}

/// In-memory plan source for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPlanSource {
    plans: RwLock<HashMap<UserId, MealPlan>>,
}

impl InMemoryPlanSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: UserId, plan: MealPlan) -> Result<(), PlanSourceError> {
        self.plans
            .write()
            .map_err(|_| PlanSourceError::Unavailable("lock poisoned".to_string()))?
            .insert(user, plan);
        Ok(())
    }
}

impl PlanSource for InMemoryPlanSource {
    fn load_meal_plan(&self, user: UserId, range: DateRange) -> Result<MealPlan, PlanSourceError> {
        let plans = self
            .plans
            .read()
            .map_err(|_| PlanSourceError::Unavailable("lock poisoned".to_string()))?;
        let plan = plans.get(&user).ok_or(PlanSourceError::NotFound(user))?;

        MealPlan::new(plan.within(range).cloned().collect())
            .map_err(|e| PlanSourceError::Invalid(e.to_string()))
    }
}
