// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const NAME_MAX_LEN: usize = 256;

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ParseError {
    Empty(&'static str),
    Trimmed(&'static str),
    TooLong(&'static str, usize),
    NonPositive(&'static str, f64),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(name) => write!(f, "{name} must not be empty"),
            Self::Trimmed(name) => {
                write!(f, "{name} must not contain leading/trailing whitespace")
            }
            Self::TooLong(name, max) => write!(f, "{name} exceeds max length {max}"),
            Self::NonPositive(name, value) => write!(f, "{name} must be positive, got {value}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// How a food's calorie density is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FoodUnit {
    #[serde(rename = "kcal_per_g")]
    KcalPerGram,
    #[serde(rename = "kcal_per_cup")]
    KcalPerCup,
}

impl FoodUnit {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KcalPerGram => "kcal_per_g",
            Self::KcalPerCup => "kcal_per_cup",
        }
    }

    /// Label for the quantity this unit measures ("g" or "cups").
    #[must_use]
    pub const fn quantity_label(self) -> &'static str {
        match self {
            Self::KcalPerGram => "g",
            Self::KcalPerCup => "cups",
        }
    }
}

impl Display for FoodUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FoodItem {
    pub id: u64,
    pub name: String,
    pub unit: FoodUnit,
    pub kcal_per_unit: f64,
    #[serde(default)]
    pub grams_per_cup: Option<f64>,
}

impl FoodItem {
    /// Checks the invariants a catalog entry must hold before it is stored.
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.name.is_empty() {
            return Err(ParseError::Empty("food name"));
        }
        if self.name.trim() != self.name {
            return Err(ParseError::Trimmed("food name"));
        }
        if self.name.len() > NAME_MAX_LEN {
            return Err(ParseError::TooLong("food name", NAME_MAX_LEN));
        }
        if self.kcal_per_unit <= 0.0 {
            return Err(ParseError::NonPositive("kcal_per_unit", self.kcal_per_unit));
        }
        if let Some(gpc) = self.grams_per_cup {
            if gpc <= 0.0 {
                return Err(ParseError::NonPositive("grams_per_cup", gpc));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chicken() -> FoodItem {
        FoodItem {
            id: 1,
            name: "Chicken".to_string(),
            unit: FoodUnit::KcalPerGram,
            kcal_per_unit: 1.5,
            grams_per_cup: None,
        }
    }

    #[test]
    fn food_unit_round_trips_through_wire_names() {
        let json = serde_json::to_string(&FoodUnit::KcalPerCup).expect("serialize");
        assert_eq!(json, "\"kcal_per_cup\"");
        let back: FoodUnit = serde_json::from_str("\"kcal_per_g\"").expect("deserialize");
        assert_eq!(back, FoodUnit::KcalPerGram);
    }

    #[test]
    fn validate_rejects_blank_and_padded_names() {
        let mut item = chicken();
        item.name = String::new();
        assert!(matches!(item.validate(), Err(ParseError::Empty(_))));
        item.name = " Chicken".to_string();
        assert!(matches!(item.validate(), Err(ParseError::Trimmed(_))));
    }

    #[test]
    fn validate_rejects_non_positive_densities() {
        let mut item = chicken();
        item.kcal_per_unit = 0.0;
        assert!(matches!(item.validate(), Err(ParseError::NonPositive(..))));
        let mut item = chicken();
        item.grams_per_cup = Some(-10.0);
        assert!(matches!(item.validate(), Err(ParseError::NonPositive(..))));
    }

    #[test]
    fn grams_per_cup_defaults_to_none_on_the_wire() {
        let item: FoodItem = serde_json::from_str(
            r#"{"id":2,"name":"Kibble","unit":"kcal_per_cup","kcal_per_unit":380.0}"#,
        )
        .expect("deserialize");
        assert_eq!(item.grams_per_cup, None);
        assert!(item.validate().is_ok());
    }
}
