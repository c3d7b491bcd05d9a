// SPDX-License-Identifier: Apache-2.0

use crate::errors::ApiErrorCode;
use crate::http::handlers::{
    api_error_response, error_json, make_request_id, store_failure, with_request_id,
};
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use babbu_feeder_model::{compute_feeding_plan, CatProfile, DietShare};
use serde::Deserialize;
use serde_json::json;
use std::time::Instant;
use tracing::info;

fn profile_not_found() -> Response {
    api_error_response(
        StatusCode::NOT_FOUND,
        error_json(ApiErrorCode::NotFound, "no cat profile stored", json!({})),
    )
}

pub(crate) async fn profile_handler(State(state): State<AppState>) -> impl IntoResponse {
    let request_id = make_request_id(&state);
    let started = Instant::now();
    let (status, resp) = match state.documents.cat_profile(&state.config.cat_id).await {
        Ok(Some(profile)) => (StatusCode::OK, Json(profile).into_response()),
        Ok(None) => (StatusCode::NOT_FOUND, profile_not_found()),
        Err(err) => {
            let resp = store_failure(&err);
            (resp.status(), resp)
        }
    };
    state
        .metrics
        .observe_request("/v1/profile", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

pub(crate) async fn put_profile_handler(
    State(state): State<AppState>,
    Json(incoming): Json<CatProfile>,
) -> impl IntoResponse {
    let request_id = make_request_id(&state);
    let started = Instant::now();
    // A profile update without a diet keeps the stored plan.
    let result = state
        .documents
        .update_cat_profile(&state.config.cat_id, move |current| {
            let mut profile = incoming;
            if profile.diet.is_none() {
                profile.diet = current.and_then(|c| c.diet);
            }
            profile
        })
        .await;
    let (status, resp) = match result {
        Ok(profile) => {
            info!(request_id = %request_id, cat_id = %state.config.cat_id, "profile saved");
            (StatusCode::OK, Json(profile).into_response())
        }
        Err(err) => {
            let resp = store_failure(&err);
            (resp.status(), resp)
        }
    };
    state
        .metrics
        .observe_request("/v1/profile", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DietRequest {
    pub composition: Vec<DietShare>,
}

async fn computed_plan_response(
    state: &AppState,
    composition: &[DietShare],
    store_plan: bool,
) -> Response {
    let profile = match state.documents.cat_profile(&state.config.cat_id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => return profile_not_found(),
        Err(err) => return store_failure(&err),
    };
    let foods = match state.documents.food_catalog().await {
        Ok(foods) => foods,
        Err(err) => return store_failure(&err),
    };
    let log = match state.documents.weight_log().await {
        Ok(log) => log,
        Err(err) => return store_failure(&err),
    };
    let Some(latest) = log.latest() else {
        return api_error_response(
            StatusCode::NOT_FOUND,
            error_json(
                ApiErrorCode::NotFound,
                "no weights logged; log a weight first",
                json!({}),
            ),
        );
    };

    let today = chrono::Utc::now().date_naive();
    let plan = match compute_feeding_plan(&profile, &foods, composition, latest.weight_kg, today) {
        Ok(plan) => plan,
        Err(e) => {
            return api_error_response(
                StatusCode::BAD_REQUEST,
                error_json(ApiErrorCode::ValidationFailed, &e.to_string(), json!({})),
            );
        }
    };

    if store_plan {
        let stored = plan.clone();
        let result = state
            .documents
            .update_cat_profile(&state.config.cat_id, move |current| {
                let mut profile = current.unwrap_or_default();
                profile.diet = Some(stored);
                profile
            })
            .await;
        if let Err(err) = result {
            return store_failure(&err);
        }
    }
    Json(plan).into_response()
}

/// Replaces the diet composition: validates it against the catalog and the
/// latest weight, computes the per-meal plan, and stores it in the profile.
pub(crate) async fn put_diet_handler(
    State(state): State<AppState>,
    Json(request): Json<DietRequest>,
) -> impl IntoResponse {
    let request_id = make_request_id(&state);
    let started = Instant::now();
    let resp = computed_plan_response(&state, &request.composition, true).await;
    let status = resp.status();
    if status == StatusCode::OK {
        info!(request_id = %request_id, cat_id = %state.config.cat_id, "diet plan saved");
    }
    state
        .metrics
        .observe_request("/v1/diet", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

/// Feeding plan computed on the fly from the stored composition.
pub(crate) async fn plan_handler(State(state): State<AppState>) -> impl IntoResponse {
    let request_id = make_request_id(&state);
    let started = Instant::now();
    let composition = match state.documents.cat_profile(&state.config.cat_id).await {
        Ok(Some(profile)) => profile
            .diet
            .map(|d| d.composition)
            .unwrap_or_default(),
        Ok(None) => {
            let resp = profile_not_found();
            state
                .metrics
                .observe_request("/v1/plan", StatusCode::NOT_FOUND, started.elapsed())
                .await;
            return with_request_id(resp, &request_id);
        }
        Err(err) => {
            let resp = store_failure(&err);
            let status = resp.status();
            state
                .metrics
                .observe_request("/v1/plan", status, started.elapsed())
                .await;
            return with_request_id(resp, &request_id);
        }
    };
    if composition.is_empty() {
        let resp = api_error_response(
            StatusCode::NOT_FOUND,
            error_json(
                ApiErrorCode::NoDietPlan,
                "no diet composition stored; set a diet first",
                json!({}),
            ),
        );
        state
            .metrics
            .observe_request("/v1/plan", StatusCode::NOT_FOUND, started.elapsed())
            .await;
        return with_request_id(resp, &request_id);
    }
    let resp = computed_plan_response(&state, &composition, false).await;
    let status = resp.status();
    state
        .metrics
        .observe_request("/v1/plan", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}
