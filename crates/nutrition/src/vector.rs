//! Nutrient vectors, target ranges and deviations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Nutrient name → amount (e.g. `"calories" → 389.0`, `"protein" → 16.9`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NutrientVector(BTreeMap<String, f64>);

impl NutrientVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, nutrient: impl Into<String>, amount: f64) -> Self {
        self.0.insert(nutrient.into(), amount);
        self
    }

    pub fn get(&self, nutrient: &str) -> f64 {
        self.0.get(nutrient).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `self += other * factor`.
    pub fn add_scaled(&mut self, other: &NutrientVector, factor: f64) {
        for (nutrient, amount) in &other.0 {
            *self.0.entry(nutrient.clone()).or_insert(0.0) += amount * factor;
        }
    }
}

impl FromIterator<(String, f64)> for NutrientVector {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Acceptable band for a nutrient total; open ends are unbounded.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl NutrientRange {
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// A nutrient total outside its target range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientDeviation {
    pub nutrient: String,
    pub actual: f64,
    pub target: NutrientRange,
}

impl NutrientDeviation {
    /// Compare `totals` against every target; missing nutrients count as zero.
    pub fn check_all<'a>(
        totals: &NutrientVector,
        targets: impl IntoIterator<Item = (&'a String, &'a NutrientRange)>,
    ) -> Vec<NutrientDeviation> {
        targets
            .into_iter()
            .filter_map(|(nutrient, range)| {
                let actual = totals.get(nutrient);
                (!range.contains(actual)).then(|| NutrientDeviation {
                    nutrient: nutrient.clone(),
                    actual,
                    target: *range,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_scaled_merges_nutrients() {
        let mut total = NutrientVector::new().with("calories", 100.0);
        let milk = NutrientVector::new().with("calories", 42.0).with("protein", 3.4);
        total.add_scaled(&milk, 2.0);
        assert_eq!(total.get("calories"), 184.0);
        assert_eq!(total.get("protein"), 6.8);
        assert_eq!(total.get("fat"), 0.0);
    }

    #[test]
    fn ranges_are_inclusive_and_open_ended() {
        assert!(NutrientRange::between(10.0, 20.0).contains(10.0));
        assert!(NutrientRange::between(10.0, 20.0).contains(20.0));
        assert!(!NutrientRange::at_least(5.0).contains(4.9));
        assert!(NutrientRange::at_most(5.0).contains(0.0));
        assert!(NutrientRange::default().contains(1e9));
    }

    #[test]
    fn deviations_report_missing_nutrients_as_zero() {
        let totals = NutrientVector::new().with("calories", 2500.0);
        let targets = BTreeMap::from([
            ("calories".to_string(), NutrientRange::between(1800.0, 2200.0)),
            ("protein".to_string(), NutrientRange::at_least(50.0)),
        ]);
        let devs = NutrientDeviation::check_all(&totals, &targets);
        assert_eq!(devs.len(), 2);
        assert_eq!(devs[0].nutrient, "calories");
        assert_eq!(devs[1].actual, 0.0);
    }
}
