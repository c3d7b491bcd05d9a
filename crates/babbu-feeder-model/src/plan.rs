// SPDX-License-Identifier: Apache-2.0

use crate::food::{FoodItem, FoodUnit};
use crate::profile::{CatProfile, DietPlan};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Percent of daily calories assigned to one catalog food.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DietShare {
    pub food_id: u64,
    pub pct_daily_kcal: f64,
}

/// One meal's allocation of one food. `grams` is absent for cup-unit foods
/// whose catalog entry has no grams-per-cup conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MealAllocation {
    pub food: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grams: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kcal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum PlanError {
    EmptyComposition,
    PercentSum(f64),
    UnknownFood(u64),
    NoMeals,
    NonPositiveWeight(f64),
}

impl Display for PlanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyComposition => f.write_str("diet composition must not be empty"),
            Self::PercentSum(total) => {
                write!(f, "diet percentages must sum to 100, got {total:.1}")
            }
            Self::UnknownFood(id) => write!(f, "diet references unknown food id {id}"),
            Self::NoMeals => f.write_str("meals_per_day must be at least 1"),
            Self::NonPositiveWeight(w) => {
                write!(f, "latest weight must be positive, got {w}")
            }
        }
    }
}

impl std::error::Error for PlanError {}

const PCT_SUM_TOLERANCE: f64 = 0.01;

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Computes the per-meal feeding plan for a profile from its diet
/// composition, the food catalog, and the latest logged weight.
///
/// Daily target is DER for the cat's life stage on `on`; each share's
/// calories are split evenly across the day's meals and converted to
/// food quantity through the catalog's calorie density. One meal row is
/// emitted per meal per share so the stored plan lists every feeding.
pub fn compute_feeding_plan(
    profile: &CatProfile,
    foods: &[FoodItem],
    composition: &[DietShare],
    latest_weight_kg: f64,
    on: NaiveDate,
) -> Result<DietPlan, PlanError> {
    if composition.is_empty() {
        return Err(PlanError::EmptyComposition);
    }
    if profile.meals_per_day == 0 {
        return Err(PlanError::NoMeals);
    }
    if latest_weight_kg <= 0.0 {
        return Err(PlanError::NonPositiveWeight(latest_weight_kg));
    }
    let total_pct: f64 = composition.iter().map(|s| s.pct_daily_kcal).sum();
    if (total_pct - 100.0).abs() > PCT_SUM_TOLERANCE {
        return Err(PlanError::PercentSum(total_pct));
    }
    let by_id: HashMap<u64, &FoodItem> = foods.iter().map(|f| (f.id, f)).collect();
    for share in composition {
        if !by_id.contains_key(&share.food_id) {
            return Err(PlanError::UnknownFood(share.food_id));
        }
    }

    let stage = profile.life_stage_on(on);
    let total_kcal = crate::energy::der_kcal(latest_weight_kg, stage);
    let meals_per_day = f64::from(profile.meals_per_day);

    let mut meals = Vec::with_capacity(composition.len() * profile.meals_per_day as usize);
    for _meal in 0..profile.meals_per_day {
        for share in composition {
            let food = by_id[&share.food_id];
            let kcal_meal = total_kcal * share.pct_daily_kcal / 100.0 / meals_per_day;
            let qty = if food.kcal_per_unit > 0.0 {
                kcal_meal / food.kcal_per_unit
            } else {
                0.0
            };
            let grams = match food.unit {
                FoodUnit::KcalPerGram => Some(round1(qty)),
                FoodUnit::KcalPerCup => food.grams_per_cup.map(|gpc| round1(qty * gpc)),
            };
            meals.push(MealAllocation {
                food: food.name.clone(),
                grams,
                kcal: Some(round1(kcal_meal)),
                qty: Some(round3(qty)),
                unit: Some(food.unit.quantity_label().to_string()),
            });
        }
    }

    Ok(DietPlan {
        composition: composition.to_vec(),
        total_kcal_per_day: Some(round1(total_kcal)),
        life_stage: Some(stage),
        meals,
    })
}
