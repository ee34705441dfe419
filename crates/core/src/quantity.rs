//! Unit-typed quantities and the fixed unit conversion table.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Amounts at or below this are treated as zero (float accumulation noise).
pub const QUANTITY_EPSILON: f64 = 1e-9;

/// Measurement unit of a quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "mg")]
    Milligram,
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "ml")]
    Milliliter,
    #[serde(rename = "l")]
    Liter,
    #[serde(rename = "tsp")]
    Teaspoon,
    #[serde(rename = "tbsp")]
    Tablespoon,
    #[serde(rename = "cup")]
    Cup,
    #[serde(rename = "piece")]
    Piece,
    #[serde(rename = "dozen")]
    Dozen,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Milligram => "mg",
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Milliliter => "ml",
            Unit::Liter => "l",
            Unit::Teaspoon => "tsp",
            Unit::Tablespoon => "tbsp",
            Unit::Cup => "cup",
            Unit::Piece => "piece",
            Unit::Dozen => "dozen",
        }
    }
}

impl core::fmt::Display for Unit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unit = match s.trim().to_lowercase().as_str() {
            "mg" | "milligram" | "milligrams" => Unit::Milligram,
            "g" | "gram" | "grams" => Unit::Gram,
            "kg" | "kilogram" | "kilograms" => Unit::Kilogram,
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => Unit::Milliliter,
            "l" | "liter" | "liters" | "litre" | "litres" => Unit::Liter,
            "tsp" | "teaspoon" | "teaspoons" => Unit::Teaspoon,
            "tbsp" | "tablespoon" | "tablespoons" => Unit::Tablespoon,
            "cup" | "cups" => Unit::Cup,
            "piece" | "pieces" | "pc" | "pcs" | "whole" => Unit::Piece,
            "dozen" => Unit::Dozen,
            other => return Err(DomainError::validation(format!("unknown unit '{other}'"))),
        };
        Ok(unit)
    }
}

/// Physical dimension a unit measures. Units convert only within a dimension.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Mass,
    Volume,
    Count,
}

/// Conversion entry: `1 unit == to_base` of the dimension's base unit.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitFactor {
    pub dimension: Dimension,
    pub to_base: f64,
}

/// Fixed unit conversion table.
///
/// Base units are grams (mass), millilitres (volume) and pieces (count).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitTable {
    factors: BTreeMap<Unit, UnitFactor>,
}

impl Default for UnitTable {
    fn default() -> Self {
        let entries = [
            (Unit::Milligram, Dimension::Mass, 0.001),
            (Unit::Gram, Dimension::Mass, 1.0),
            (Unit::Kilogram, Dimension::Mass, 1000.0),
            (Unit::Milliliter, Dimension::Volume, 1.0),
            (Unit::Liter, Dimension::Volume, 1000.0),
            (Unit::Teaspoon, Dimension::Volume, 5.0),
            (Unit::Tablespoon, Dimension::Volume, 15.0),
            (Unit::Cup, Dimension::Volume, 240.0),
            (Unit::Piece, Dimension::Count, 1.0),
            (Unit::Dozen, Dimension::Count, 12.0),
        ];
        Self {
            factors: entries
                .into_iter()
                .map(|(unit, dimension, to_base)| (unit, UnitFactor { dimension, to_base }))
                .collect(),
        }
    }
}

impl UnitTable {
    /// An empty table: only identical units are compatible.
    pub fn empty() -> Self {
        Self {
            factors: BTreeMap::new(),
        }
    }

    pub fn with_factor(mut self, unit: Unit, dimension: Dimension, to_base: f64) -> Self {
        self.factors.insert(unit, UnitFactor { dimension, to_base });
        self
    }

    pub fn factor(&self, unit: Unit) -> Option<UnitFactor> {
        self.factors.get(&unit).copied()
    }

    pub fn validate(&self) -> DomainResult<()> {
        for (unit, factor) in &self.factors {
            if !(factor.to_base.is_finite() && factor.to_base > 0.0) {
                return Err(DomainError::validation(format!(
                    "conversion factor for '{unit}' must be a finite positive number"
                )));
            }
        }
        Ok(())
    }

    /// Whether amounts in `a` can be expressed in `b`.
    pub fn compatible(&self, a: Unit, b: Unit) -> bool {
        if a == b {
            return true;
        }
        match (self.factor(a), self.factor(b)) {
            (Some(fa), Some(fb)) => fa.dimension == fb.dimension,
            _ => false,
        }
    }

    /// Convert `amount` from `from` into `to`.
    pub fn convert(&self, amount: f64, from: Unit, to: Unit) -> DomainResult<f64> {
        if from == to {
            return Ok(amount);
        }
        match (self.factor(from), self.factor(to)) {
            (Some(ff), Some(ft)) if ff.dimension == ft.dimension => {
                Ok(amount * ff.to_base / ft.to_base)
            }
            _ => Err(DomainError::unit_mismatch(to, from)),
        }
    }
}

/// A non-negative amount tagged with its unit.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub amount: f64,
    pub unit: Unit,
}

impl ValueObject for Quantity {}

impl Quantity {
    pub fn new(amount: f64, unit: Unit) -> Self {
        Self { amount, unit }
    }

    pub fn zero(unit: Unit) -> Self {
        Self { amount: 0.0, unit }
    }

    pub fn is_zero(&self) -> bool {
        self.amount.abs() <= QUANTITY_EPSILON
    }

    /// Reject negative, NaN and infinite amounts.
    pub fn validate(&self) -> DomainResult<()> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(DomainError::validation(format!(
                "quantity must be a finite non-negative number (got {} {})",
                self.amount, self.unit
            )));
        }
        Ok(())
    }

    /// Sum two quantities of the same unit.
    pub fn checked_add(self, other: Quantity) -> DomainResult<Quantity> {
        if self.unit != other.unit {
            return Err(DomainError::unit_mismatch(self.unit, other.unit));
        }
        Ok(Quantity::new(self.amount + other.amount, self.unit))
    }

    /// Express this quantity in `unit`.
    pub fn convert_to(&self, unit: Unit, table: &UnitTable) -> DomainResult<Quantity> {
        Ok(Quantity::new(table.convert(self.amount, self.unit, unit)?, unit))
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", round_for_display(self.amount), self.unit)
    }
}

fn round_for_display(amount: f64) -> f64 {
    (amount * 1000.0).round() / 1000.0
}
