//! Food catalog entities as returned by the USDA NDB nutrient report endpoint

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single nutrient measurement attached to a food.
///
/// The catalog reports `value` as numeric text ("4.2", "0"); parsing
/// happens in the pipeline, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodNutrient {
    /// Nutrient display name, e.g. "Sugars, total"
    pub nutrient: String,
    /// Unit of measure, e.g. "g"
    pub unit: String,
    /// Measured amount as numeric text
    pub value: String,
}

impl fmt::Display for FoodNutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.nutrient, self.value, self.unit)
    }
}

/// A catalog food entry with its nutrient report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Food {
    /// NDB number — the catalog's food identifier
    pub ndbno: String,
    /// Display name
    pub name: String,
    /// Serving measure, e.g. "1.0 cup"
    pub measure: String,
    /// Ordered nutrient list; the catalog may omit it entirely
    #[serde(default)]
    pub nutrients: Vec<FoodNutrient>,
}

/// The `report` container inside a nutrient report response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodReport {
    #[serde(default)]
    pub foods: Vec<Food>,
}

/// Top-level nutrient report response.
///
/// A missing or empty `report` is a valid response ("no food found"),
/// not a deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodResponse {
    #[serde(default)]
    pub report: Option<FoodReport>,
}

impl FoodResponse {
    /// Take the first food of the report, if any.
    pub fn into_first_food(self) -> Option<Food> {
        self.report.and_then(|r| r.foods.into_iter().next())
    }
}
