// SPDX-License-Identifier: Apache-2.0

use crate::{Document, DocumentLocks, DocumentStore, StoreError, StoreErrorCode};
use babbu_feeder_model::{CatProfile, FoodItem, FoodUnit, WeightEntry, WeightLog};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Catalog entry as submitted by a caller; the id is assigned on insert.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewFood {
    pub name: String,
    pub unit: FoodUnit,
    pub kcal_per_unit: f64,
    #[serde(default)]
    pub grams_per_cup: Option<f64>,
}

/// Typed view over the raw document store. Owns the serde conversions and
/// the per-document write serialization: every read-modify-write cycle runs
/// under that document's lock.
pub struct Documents {
    store: Arc<dyn DocumentStore>,
    locks: DocumentLocks,
}

fn shape_error(document: Document, e: &serde_json::Error) -> StoreError {
    StoreError::new(
        StoreErrorCode::Validation,
        format!("stored document {document} has unexpected shape: {e}"),
    )
}

impl Documents {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            locks: DocumentLocks::default(),
        }
    }

    #[must_use]
    pub fn backend_tag(&self) -> &'static str {
        self.store.backend_tag()
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// The weight log, empty when the document has never been written.
    pub async fn weight_log(&self) -> Result<WeightLog, StoreError> {
        match self.store.load(Document::WeightLog).await? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| shape_error(Document::WeightLog, &e)),
            None => Ok(WeightLog::default()),
        }
    }

    /// Upserts one weight entry (by date) under the weight-log lock.
    pub async fn record_weight(&self, entry: WeightEntry) -> Result<WeightLog, StoreError> {
        let _guard = self.locks.hold(Document::WeightLog).await;
        let mut log = self.weight_log().await?;
        log.upsert(entry);
        let value = serde_json::to_value(&log)
            .map_err(|e| StoreError::new(StoreErrorCode::Internal, e.to_string()))?;
        self.store.save(Document::WeightLog, &value).await?;
        Ok(log)
    }

    /// The food catalog, empty when the document has never been written.
    pub async fn food_catalog(&self) -> Result<Vec<FoodItem>, StoreError> {
        match self.store.load(Document::FoodCatalog).await? {
            Some(value) => {
                #[derive(Deserialize)]
                struct FoodsDocument {
                    #[serde(default)]
                    foods: Vec<FoodItem>,
                }
                let doc: FoodsDocument = serde_json::from_value(value)
                    .map_err(|e| shape_error(Document::FoodCatalog, &e))?;
                Ok(doc.foods)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Adds a food with a server-assigned id (`max(id) + 1`).
    pub async fn add_food(&self, new: NewFood) -> Result<FoodItem, StoreError> {
        let _guard = self.locks.hold(Document::FoodCatalog).await;
        let mut foods = self.food_catalog().await?;
        let id = foods.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        let item = FoodItem {
            id,
            name: new.name,
            unit: new.unit,
            kcal_per_unit: new.kcal_per_unit,
            grams_per_cup: new.grams_per_cup,
        };
        item.validate()
            .map_err(|e| StoreError::new(StoreErrorCode::Validation, e.to_string()))?;
        foods.push(item.clone());
        self.save_food_catalog(&foods).await?;
        Ok(item)
    }

    /// Removes a food by id; returns whether anything was removed.
    pub async fn remove_food(&self, id: u64) -> Result<bool, StoreError> {
        let _guard = self.locks.hold(Document::FoodCatalog).await;
        let mut foods = self.food_catalog().await?;
        let before = foods.len();
        foods.retain(|f| f.id != id);
        if foods.len() == before {
            return Ok(false);
        }
        self.save_food_catalog(&foods).await?;
        Ok(true)
    }

    async fn save_food_catalog(&self, foods: &[FoodItem]) -> Result<(), StoreError> {
        let value = json!({ "foods": foods });
        self.store.save(Document::FoodCatalog, &value).await
    }

    /// The profile for `cat_id`, honoring the three accepted document
    /// shapes: a `profiles` map keyed by cat id, a `profile` wrapper, or
    /// the profile at the document top level.
    pub async fn cat_profile(&self, cat_id: &str) -> Result<Option<CatProfile>, StoreError> {
        let Some(doc) = self.store.load(Document::CatProfile).await? else {
            return Ok(None);
        };
        profile_from_document(&doc, cat_id)
    }

    /// Replaces the profile for `cat_id`, preserving a `profiles` map when
    /// the stored document uses one.
    pub async fn save_cat_profile(
        &self,
        cat_id: &str,
        profile: &CatProfile,
    ) -> Result<(), StoreError> {
        let _guard = self.locks.hold(Document::CatProfile).await;
        self.save_cat_profile_locked(cat_id, profile).await
    }

    /// Updates the profile for `cat_id` in one read-modify-write cycle
    /// under the profile lock. `apply` sees the stored profile (or `None`)
    /// and returns the profile to store.
    pub async fn update_cat_profile<F>(
        &self,
        cat_id: &str,
        apply: F,
    ) -> Result<CatProfile, StoreError>
    where
        F: FnOnce(Option<CatProfile>) -> CatProfile + Send,
    {
        let _guard = self.locks.hold(Document::CatProfile).await;
        let current = match self.store.load(Document::CatProfile).await? {
            Some(doc) => profile_from_document(&doc, cat_id)?,
            None => None,
        };
        let updated = apply(current);
        self.save_cat_profile_locked(cat_id, &updated).await?;
        Ok(updated)
    }

    async fn save_cat_profile_locked(
        &self,
        cat_id: &str,
        profile: &CatProfile,
    ) -> Result<(), StoreError> {
        let profile_value = serde_json::to_value(profile)
            .map_err(|e| StoreError::new(StoreErrorCode::Internal, e.to_string()))?;
        let existing = self.store.load(Document::CatProfile).await?;
        let doc = match existing {
            Some(mut doc) if doc.get("profiles").is_some_and(Value::is_object) => {
                if let Some(profiles) = doc
                    .get_mut("profiles")
                    .and_then(Value::as_object_mut)
                {
                    profiles.insert(cat_id.to_string(), profile_value);
                }
                doc
            }
            _ => profile_value,
        };
        self.store.save(Document::CatProfile, &doc).await
    }
}

fn profile_from_document(doc: &Value, cat_id: &str) -> Result<Option<CatProfile>, StoreError> {
    let node = if let Some(profiles) = doc.get("profiles").and_then(Value::as_object) {
        match profiles.get(cat_id) {
            Some(node) => node,
            None => return Ok(None),
        }
    } else if let Some(wrapped) = doc.get("profile") {
        wrapped
    } else {
        doc
    };
    if node.is_null() {
        return Ok(None);
    }
    serde_json::from_value(node.clone())
        .map(Some)
        .map_err(|e| shape_error(Document::CatProfile, &e))
}
