//! Meal plans and their entries.
//!
//! A plan is authored elsewhere and read-only here. Construction checks that
//! entries are in date order and that no `(date, slot)` pair repeats.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use larder_core::{DateRange, DomainError, DomainResult, RecipeId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl core::fmt::Display for MealSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snack => "snack",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealEntry {
    pub date: NaiveDate,
    pub slot: MealSlot,
    pub recipe: RecipeId,
    pub servings: u32,
}

impl MealEntry {
    pub fn new(date: NaiveDate, slot: MealSlot, recipe: RecipeId, servings: u32) -> Self {
        Self {
            date,
            slot,
            recipe,
            servings,
        }
    }
}

/// Ordered sequence of meal entries.
///
/// Invariants: dates are non-decreasing, no two entries share `(date, slot)`,
/// and every entry has at least one serving.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MealEntry>", into = "Vec<MealEntry>")]
pub struct MealPlan {
    entries: Vec<MealEntry>,
}

impl MealPlan {
    pub fn new(entries: Vec<MealEntry>) -> DomainResult<Self> {
        let mut seen = HashSet::with_capacity(entries.len());
        for (idx, pair) in entries.windows(2).enumerate() {
            if pair[1].date < pair[0].date {
                return Err(DomainError::validation(format!(
                    "meal plan entries out of order at index {}: {} after {}",
                    idx + 1,
                    pair[1].date,
                    pair[0].date
                )));
            }
        }
        for entry in &entries {
            if entry.servings == 0 {
                return Err(DomainError::validation(format!(
                    "meal plan entry {} {} has zero servings",
                    entry.date, entry.slot
                )));
            }
            if !seen.insert((entry.date, entry.slot)) {
                return Err(DomainError::validation(format!(
                    "meal plan has two entries for {} {}",
                    entry.date, entry.slot
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Sort by `(date, slot)` first, then validate.
    pub fn from_unordered(mut entries: Vec<MealEntry>) -> DomainResult<Self> {
        entries.sort_by(|a, b| (a.date, a.slot).cmp(&(b.date, b.slot)));
        Self::new(entries)
    }

    pub fn entries(&self) -> &[MealEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries dated within `range`, in plan order.
    pub fn within(&self, range: DateRange) -> impl Iterator<Item = &MealEntry> {
        self.entries
            .iter()
            .skip_while(move |e| e.date < range.start())
            .take_while(move |e| e.date <= range.end())
    }
}

impl TryFrom<Vec<MealEntry>> for MealPlan {
    type Error = DomainError;

    fn try_from(entries: Vec<MealEntry>) -> Result<Self, Self::Error> {
        MealPlan::new(entries)
    }
}

impl From<MealPlan> for Vec<MealEntry> {
    fn from(plan: MealPlan) -> Self {
        plan.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, day).unwrap()
    }

    fn entry(day: u32, slot: MealSlot) -> MealEntry {
        MealEntry::new(d(day), slot, RecipeId::new("toast"), 1)
    }

    #[test]
    fn rejects_out_of_order_entries() {
        let err = MealPlan::new(vec![entry(2, MealSlot::Lunch), entry(1, MealSlot::Lunch)]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn rejects_duplicate_date_and_slot() {
        let err = MealPlan::new(vec![entry(1, MealSlot::Lunch), entry(1, MealSlot::Lunch)]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn same_day_different_slots_are_fine_in_any_slot_order() {
        let plan = MealPlan::new(vec![entry(1, MealSlot::Dinner), entry(1, MealSlot::Breakfast)]).unwrap();
        assert_eq!(plan.entries().len(), 2);
    }

    #[test]
    fn rejects_zero_servings() {
        let mut e = entry(1, MealSlot::Snack);
        e.servings = 0;
        assert!(MealPlan::new(vec![e]).is_err());
    }

    #[test]
    fn from_unordered_sorts_by_date_then_slot() {
        let plan = MealPlan::from_unordered(vec![
            entry(3, MealSlot::Lunch),
            entry(1, MealSlot::Dinner),
            entry(1, MealSlot::Breakfast),
        ])
        .unwrap();
        let order: Vec<(NaiveDate, MealSlot)> = plan.entries().iter().map(|e| (e.date, e.slot)).collect();
        assert_eq!(
            order,
            vec![(d(1), MealSlot::Breakfast), (d(1), MealSlot::Dinner), (d(3), MealSlot::Lunch)]
        );
    }

    #[test]
    fn within_selects_inclusive_range() {
        let plan = MealPlan::new((1..=5).map(|day| entry(day, MealSlot::Lunch)).collect()).unwrap();
        let range = DateRange::new(d(2), d(4)).unwrap();
        let days: Vec<NaiveDate> = plan.within(range).map(|e| e.date).collect();
        assert_eq!(days, vec![d(2), d(3), d(4)]);
    }

    #[test]
    fn deserialization_enforces_invariants() {
        let json = r#"[
            { "date": "2024-09-02", "slot": "lunch", "recipe": "toast", "servings": 1 },
            { "date": "2024-09-01", "slot": "lunch", "recipe": "toast", "servings": 1 }
        ]"#;
        assert!(serde_json::from_str::<MealPlan>(json).is_err());
    }
}
