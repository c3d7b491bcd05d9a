// SPDX-License-Identifier: Apache-2.0

use crate::plan::{DietShare, MealAllocation};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum LifeStage {
    #[serde(rename = "kitten_0_4m")]
    Kitten0To4Months,
    #[serde(rename = "kitten_4_12m")]
    Kitten4To12Months,
    #[serde(rename = "adult_neutered")]
    AdultNeutered,
    #[serde(rename = "adult_intact")]
    AdultIntact,
    #[serde(rename = "adult_obese_prone")]
    AdultObeseProne,
}

impl LifeStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kitten0To4Months => "kitten_0_4m",
            Self::Kitten4To12Months => "kitten_4_12m",
            Self::AdultNeutered => "adult_neutered",
            Self::AdultIntact => "adult_intact",
            Self::AdultObeseProne => "adult_obese_prone",
        }
    }

    /// Human-readable label used by the daily summary email.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Kitten0To4Months => "Kitten (0-4 months)",
            Self::Kitten4To12Months => "Kitten (4-12 months)",
            Self::AdultNeutered => "Adult, neutered",
            Self::AdultIntact => "Adult, intact",
            Self::AdultObeseProne => "Adult, obese-prone",
        }
    }
}

impl Display for LifeStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The computed per-meal food/gram allocation stored inside the profile.
///
/// Only `meals` is required on read; older or hand-seeded documents carry
/// nothing else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DietPlan {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub composition: Vec<DietShare>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_kcal_per_day: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_stage: Option<LifeStage>,
    #[serde(default)]
    pub meals: Vec<MealAllocation>,
}

impl DietPlan {
    #[must_use]
    pub fn has_meals(&self) -> bool {
        !self.meals.is_empty()
    }
}

fn default_anchor_age_weeks() -> f64 {
    8.0
}

fn default_meals_per_day() -> u32 {
    3
}

/// The `cat_profile/cat_profile.json` singleton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_date: Option<NaiveDate>,
    #[serde(default = "default_anchor_age_weeks")]
    pub anchor_age_weeks: f64,
    #[serde(default = "default_meals_per_day")]
    pub meals_per_day: u32,
    #[serde(default)]
    pub life_stage_override: Option<LifeStage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet: Option<DietPlan>,
}

impl Default for CatProfile {
    fn default() -> Self {
        Self {
            name: None,
            anchor_date: None,
            anchor_age_weeks: default_anchor_age_weeks(),
            meals_per_day: default_meals_per_day(),
            life_stage_override: None,
            diet: None,
        }
    }
}

impl CatProfile {
    /// Life stage on `on`: the override when set, otherwise inferred from
    /// age. Profiles without an anchor date fall back to the default anchor
    /// age as of `on`.
    #[must_use]
    pub fn life_stage_on(&self, on: NaiveDate) -> LifeStage {
        if let Some(stage) = self.life_stage_override {
            return stage;
        }
        let age = match self.anchor_date {
            Some(anchor) => crate::energy::age_weeks(anchor, self.anchor_age_weeks, on),
            None => self.anchor_age_weeks,
        };
        crate::energy::infer_life_stage(age)
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("your cat")
    }
}
