//! Core data types for the nutrient classification pipeline

mod food;
mod tier;

pub use food::{Food, FoodNutrient, FoodReport, FoodResponse};
pub use tier::Tier;
