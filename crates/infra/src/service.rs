//! Reconciliation orchestration over the collaborator contracts.
//!
//! ```text
//! load stock ─▶ build ledger ─▶ load plan ─▶ run ─▶ publish alerts
//!                                                 └▶ publish shopping list
//! ```
//!
//! The service owns no state beyond its configuration and recipe book; every
//! run works on a fresh snapshot, so concurrent runs never see each other's
//! intermediate results. Stock writes go through the store's version checks.

use chrono::NaiveDate;
use thiserror::Error;

use larder_core::{DateRange, DomainError, ExpectedVersion, HouseholdId, ItemId, Quantity, UserId};
use larder_inventory::{BatchDraw, StockBatch, StockLedger};
use larder_nutrition::NutrientLookup;
use larder_planning::{DietaryProfile, RecipeBook};
use larder_reconciliation::{ReconcileConfig, Reconciler, RunReport};

use crate::plan_source::{PlanSource, PlanSourceError};
use crate::sinks::{AlertSink, ShoppingListSink};
use crate::stock_store::{StockStore, StockStoreError, StockWrite};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Stock(#[from] StockStoreError),

    #[error(transparent)]
    Plan(#[from] PlanSourceError),
}

impl ServiceError {
    /// A stock write lost a race; reload and retry.
    pub fn is_conflict(&self) -> bool {
        match self {
            ServiceError::Stock(e) => e.is_conflict(),
            ServiceError::Domain(e) => e.is_conflict(),
            ServiceError::Plan(_) => false,
        }
    }
}

/// The collaborators a service talks to.
#[derive(Debug, Clone)]
pub struct Collaborators<S, P, N, A, L> {
    pub stock: S,
    pub plans: P,
    pub nutrients: N,
    pub alerts: A,
    pub shopping_lists: L,
}

/// Who and what a run is for.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub household: HouseholdId,
    pub user: UserId,
    pub range: DateRange,
    pub reference_date: NaiveDate,
    pub profile: DietaryProfile,
}

#[derive(Debug)]
pub struct ReconciliationService<S, P, N, A, L> {
    config: ReconcileConfig,
    recipes: RecipeBook,
    collaborators: Collaborators<S, P, N, A, L>,
}

impl<S, P, N, A, L> ReconciliationService<S, P, N, A, L>
where
    S: StockStore,
    P: PlanSource,
    N: NutrientLookup,
    A: AlertSink,
    L: ShoppingListSink,
{
    /// Fails if `config` is invalid.
    pub fn new(
        config: ReconcileConfig,
        recipes: RecipeBook,
        collaborators: Collaborators<S, P, N, A, L>,
    ) -> Result<Self, ServiceError> {
        config.validate()?;
        Ok(Self {
            config,
            recipes,
            collaborators,
        })
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn collaborators(&self) -> &Collaborators<S, P, N, A, L> {
        &self.collaborators
    }

    fn load_ledger(&self, household: HouseholdId) -> Result<(Vec<StockBatch>, StockLedger), ServiceError> {
        let batches = self.collaborators.stock.load_stock(household)?;
        let ledger = StockLedger::from_batches(batches.iter().cloned(), self.config.units.clone())?;
        Ok((batches, ledger))
    }

    /// Run a reconciliation and publish its alerts and shopping list.
    pub fn run(&self, request: &RunRequest) -> Result<RunReport, ServiceError> {
        let (_, ledger) = self.load_ledger(request.household)?;
        let plan = self.collaborators.plans.load_meal_plan(request.user, request.range)?;

        let report = Reconciler::new(
            &self.config,
            &self.recipes,
            &request.profile,
            &self.collaborators.nutrients,
        )
        .run(&ledger, &plan, request.range, request.reference_date)?;

        self.collaborators.alerts.publish_alerts(request.household, &report.alerts);
        self.collaborators
            .shopping_lists
            .publish_shopping_list(request.household, &report.shopping_list);

        Ok(report)
    }

    /// Record a purchase (or gift, harvest...) as a new batch.
    ///
    /// `UnitMismatch` if the batch unit cannot be expressed in the unit the
    /// household already tracks the item in.
    pub fn record_purchase(
        &self,
        household: HouseholdId,
        batch: StockBatch,
    ) -> Result<StockBatch, ServiceError> {
        let (_, mut ledger) = self.load_ledger(household)?;
        ledger.restock(batch.clone())?;

        let stored = self
            .collaborators
            .stock
            .write_stock(household, batch, ExpectedVersion::New)?;
        tracing::info!(%household, item = %stored.item, batch = %stored.id, "recorded purchase");
        Ok(stored)
    }

    /// Record consumption of `quantity` of `item` on `on`, FIFO by expiry.
    ///
    /// Every touched batch is written with the version it was read at, in one
    /// atomic store call; a concurrent writer makes this fail with a conflict
    /// and nothing is written.
    pub fn record_consumption(
        &self,
        household: HouseholdId,
        item: &ItemId,
        quantity: Quantity,
        on: NaiveDate,
    ) -> Result<Vec<BatchDraw>, ServiceError> {
        let (loaded, mut ledger) = self.load_ledger(household)?;
        let draws = ledger.deplete(item, quantity, on)?;

        let writes = draws
            .iter()
            .map(|draw| {
                let original = loaded
                    .iter()
                    .find(|b| b.id == draw.batch)
                    .ok_or_else(|| DomainError::invariant(format!("drawn batch {} was not loaded", draw.batch)))?;
                let mut updated = original.clone();
                updated.quantity = draw.remaining.amount;
                updated.unit = draw.remaining.unit;
                Ok(StockWrite::new(updated, ExpectedVersion::Exact(draw.version)))
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        self.collaborators.stock.write_batches(household, writes)?;
        tracing::info!(%household, %item, %quantity, draws = draws.len(), "recorded consumption");
        Ok(draws)
    }
}
