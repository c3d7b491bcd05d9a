// SPDX-License-Identifier: Apache-2.0

use crate::profile::LifeStage;
use chrono::NaiveDate;

#[must_use]
pub fn weeks_between(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days() as f64 / 7.0
}

/// Age in weeks on `on`, projected from the recorded anchor point.
#[must_use]
pub fn age_weeks(anchor_date: NaiveDate, anchor_age_weeks: f64, on: NaiveDate) -> f64 {
    anchor_age_weeks + weeks_between(anchor_date, on)
}

/// Maps age to a life stage when the profile carries no override.
#[must_use]
pub fn infer_life_stage(age_weeks: f64) -> LifeStage {
    if age_weeks < 16.0 {
        LifeStage::Kitten0To4Months
    } else if age_weeks < 52.0 {
        LifeStage::Kitten4To12Months
    } else {
        LifeStage::AdultNeutered
    }
}

/// Resting energy requirement: 70 * kg^0.75.
#[must_use]
pub fn rer_kcal(weight_kg: f64) -> f64 {
    70.0 * weight_kg.powf(0.75)
}

/// Life-stage multiplier applied to RER, per common veterinary guidance.
#[must_use]
pub const fn der_factor(stage: LifeStage) -> f64 {
    match stage {
        LifeStage::Kitten0To4Months => 2.5,
        LifeStage::Kitten4To12Months => 2.0,
        LifeStage::AdultNeutered => 1.2,
        LifeStage::AdultIntact => 1.4,
        LifeStage::AdultObeseProne => 1.0,
    }
}

/// Daily energy requirement for the given weight and life stage.
#[must_use]
pub fn der_kcal(weight_kg: f64, stage: LifeStage) -> f64 {
    rer_kcal(weight_kg) * der_factor(stage)
}
