// SPDX-License-Identifier: Apache-2.0

use crate::food::ParseError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeightEntry {
    pub dt: NaiveDate,
    pub weight_kg: f64,
}

impl WeightEntry {
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.weight_kg <= 0.0 {
            return Err(ParseError::NonPositive("weight_kg", self.weight_kg));
        }
        Ok(())
    }
}

/// The whole `logs/logs.json` document. Entries stay sorted ascending by
/// date; one entry per date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeightLog {
    #[serde(default)]
    pub weights: Vec<WeightEntry>,
}

impl WeightLog {
    /// Inserts the entry, replacing any existing entry for the same date.
    pub fn upsert(&mut self, entry: WeightEntry) {
        self.weights.retain(|w| w.dt != entry.dt);
        self.weights.push(entry);
        self.weights.sort_by_key(|w| w.dt);
    }

    #[must_use]
    pub fn latest(&self) -> Option<&WeightEntry> {
        self.weights.last()
    }
}
