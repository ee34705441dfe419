use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use larder_core::{DateRange, ItemId, Quantity, RecipeId, Unit, UnitTable};
use larder_inventory::{Freshness, StockBatch, StockLedger};
use larder_nutrition::{NutrientLookup, NutrientProfile, NutrientVector};
use larder_planning::{DietaryProfile, IngredientLine, MealEntry, MealPlan, MealSlot, Recipe, RecipeBook};
use larder_reconciliation::{AlertKind, ReconcileConfig, Reconciler, RunReport};

struct Milk;

impl NutrientLookup for Milk {
    fn lookup_nutrients(&self, ingredient: &ItemId) -> Option<NutrientProfile> {
        (ingredient.as_str() == "milk").then(|| {
            NutrientProfile::new(
                Quantity::new(100.0, Unit::Milliliter),
                NutrientVector::new().with("calories", 42.0),
            )
        })
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

fn plus(days: u64) -> NaiveDate {
    today().checked_add_days(Days::new(days)).unwrap()
}

fn recipes() -> RecipeBook {
    RecipeBook::from_recipes([
        Recipe::per_serving(
            RecipeId::new("glass of milk"),
            vec![IngredientLine::new(ItemId::new("milk"), Quantity::new(250.0, Unit::Milliliter)).tagged("dairy")],
        ),
        Recipe::batch(
            RecipeId::new("bread"),
            8,
            vec![IngredientLine::new(ItemId::new("flour"), Quantity::new(500.0, Unit::Gram))],
        ),
    ])
    .unwrap()
}

fn run(config: &ReconcileConfig, ledger: &StockLedger, plan: &MealPlan, range: DateRange) -> RunReport {
    let recipes = recipes();
    let profile = DietaryProfile::new();
    Reconciler::new(config, &recipes, &profile, Milk)
        .run(ledger, plan, range, today())
        .unwrap()
}

#[test]
fn milk_expiring_tomorrow_runs_short_the_day_after() {
    let milk = ItemId::new("milk");
    let config = ReconcileConfig::default().with_increment(milk.clone(), Quantity::new(1.0, Unit::Liter));
    let ledger = StockLedger::from_batches(
        [StockBatch::new(milk.clone(), Quantity::new(2.0, Unit::Liter), today()).expiring_on(plus(1))],
        config.units.clone(),
    )
    .unwrap();
    let plan = MealPlan::new(vec![
        MealEntry::new(plus(1), MealSlot::Breakfast, RecipeId::new("glass of milk"), 4),
        MealEntry::new(plus(2), MealSlot::Breakfast, RecipeId::new("glass of milk"), 4),
    ])
    .unwrap();

    let report = run(&config, &ledger, &plan, DateRange::new(today(), plus(2)).unwrap());

    assert_eq!(report.classifications.len(), 1);
    assert_eq!(report.classifications[0].freshness, Freshness::Critical);

    assert_eq!(report.shortages.len(), 1);
    assert_eq!(report.shortages[0].date, plus(2));
    assert_eq!(report.shortages[0].shortage, Quantity::new(1.0, Unit::Liter));

    let kinds: Vec<AlertKind> = report.alerts.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![AlertKind::ExpiringSoon, AlertKind::ForecastShortage]);
    assert!(report.alerts.iter().all(|a| a.item == milk));

    assert_eq!(report.shopping_list.len(), 1);
    assert_eq!(report.shopping_list[0].quantity, Quantity::new(1.0, Unit::Liter));
    assert_eq!(report.shopping_list[0].needed_by, plus(2));

    assert!(report.warnings.is_empty());
    assert_eq!(report.nutrition.len(), 2);
}

#[test]
fn vegan_profile_skips_dairy_entries_but_keeps_the_rest() {
    let config = ReconcileConfig::default();
    let recipes = recipes();
    let profile = DietaryProfile::vegan();
    let plan = MealPlan::new(vec![
        MealEntry::new(plus(1), MealSlot::Breakfast, RecipeId::new("glass of milk"), 1),
        MealEntry::new(plus(1), MealSlot::Dinner, RecipeId::new("bread"), 8),
    ])
    .unwrap();

    let report = Reconciler::new(&config, &recipes, &profile, Milk)
        .run(&StockLedger::default(), &plan, DateRange::new(today(), plus(1)).unwrap(), today())
        .unwrap();

    assert_eq!(report.shortages.len(), 1);
    assert_eq!(report.shortages[0].item, ItemId::new("flour"));
    assert_eq!(report.shortages[0].shortage, Quantity::new(500.0, Unit::Gram));
    assert_eq!(report.warnings.len(), 2);
}

#[test]
fn low_stock_threshold_raises_a_single_alert() {
    let rice = ItemId::new("rice");
    let config = ReconcileConfig::default().with_threshold(rice.clone(), Quantity::new(1.0, Unit::Kilogram));
    let ledger = StockLedger::from_batches(
        [
            StockBatch::new(rice.clone(), Quantity::new(200.0, Unit::Gram), today()),
            StockBatch::new(rice.clone(), Quantity::new(300.0, Unit::Gram), today()),
        ],
        config.units.clone(),
    )
    .unwrap();

    let report = run(&config, &ledger, &MealPlan::default(), DateRange::new(today(), plus(6)).unwrap());

    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].kind, AlertKind::LowStock);
    assert!((report.alerts[0].severity - 0.5).abs() < 1e-9);
    assert_eq!(report.summary.low_stock_items, 1);
    assert!(report.shopping_list.is_empty());
}

fn batches() -> impl Strategy<Value = Vec<(bool, f64, Option<u64>)>> {
    proptest::collection::vec((any::<bool>(), 0.1f64..3.0, proptest::option::of(0u64..8)), 0..8)
}

fn meals() -> impl Strategy<Value = Vec<(u64, u32, u32)>> {
    proptest::collection::btree_map(0u64..10, (0u32..6, 0u32..12), 0..10)
        .prop_map(|m| m.into_iter().map(|(day, (glasses, slices))| (day, glasses, slices)).collect())
}

fn build(stock: &[(bool, f64, Option<u64>)], meals: &[(u64, u32, u32)]) -> (StockLedger, MealPlan) {
    let ledger = StockLedger::from_batches(
        stock.iter().map(|&(is_milk, amount, expires)| {
            let batch = if is_milk {
                StockBatch::new(ItemId::new("milk"), Quantity::new(amount, Unit::Liter), today())
            } else {
                StockBatch::new(ItemId::new("flour"), Quantity::new(amount * 1000.0, Unit::Gram), today())
            };
            match expires {
                Some(days) => batch.expiring_on(plus(days)),
                None => batch,
            }
        }),
        UnitTable::default(),
    )
    .unwrap();

    let mut entries = Vec::new();
    for &(day, glasses, slices) in meals {
        if glasses > 0 {
            entries.push(MealEntry::new(plus(day), MealSlot::Breakfast, RecipeId::new("glass of milk"), glasses));
        }
        if slices > 0 {
            entries.push(MealEntry::new(plus(day), MealSlot::Dinner, RecipeId::new("bread"), slices));
        }
    }
    (ledger, MealPlan::new(entries).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 96, ..ProptestConfig::default() })]

    /// Property: buying the shopping list (as non-expiring stock) and re-running
    /// over the same plan leaves no shortages.
    #[test]
    fn shopping_list_covers_every_shortage(
        stock in batches(),
        meals in meals(),
        pack_ml in prop::sample::select(vec![None, Some(250.0), Some(1000.0)]),
    ) {
        let (mut ledger, plan) = build(&stock, &meals);
        let mut config = ReconcileConfig::default();
        if let Some(ml) = pack_ml {
            config = config.with_increment(ItemId::new("milk"), Quantity::new(ml, Unit::Milliliter));
        }
        let range = DateRange::new(today(), plus(10)).unwrap();

        let first = run(&config, &ledger, &plan, range);
        for entry in &first.shopping_list {
            prop_assert!(entry.quantity.convert_to(entry.shortfall.unit, &config.units).unwrap().amount
                >= entry.shortfall.amount - 1e-9);
            ledger
                .restock(StockBatch::new(entry.item.clone(), entry.quantity, today()))
                .unwrap();
        }

        let second = run(&config, &ledger, &plan, range);
        prop_assert!(second.shortages.is_empty(), "left over: {:?}", second.shortages);
    }

    /// Property: every (item, kind) appears at most once in a run's alerts.
    #[test]
    fn runs_never_repeat_an_alert(stock in batches(), meals in meals()) {
        let (ledger, plan) = build(&stock, &meals);
        let config = ReconcileConfig::default()
            .with_threshold(ItemId::new("milk"), Quantity::new(1.0, Unit::Liter));
        let report = run(&config, &ledger, &plan, DateRange::new(today(), plus(10)).unwrap());

        let mut keys: Vec<(ItemId, AlertKind)> =
            report.alerts.iter().map(|a| (a.item.clone(), a.kind)).collect();
        let before = keys.len();
        keys.sort();
        keys.dedup();
        prop_assert_eq!(keys.len(), before);
    }
}
