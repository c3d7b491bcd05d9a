// SPDX-License-Identifier: Apache-2.0

use crate::errors::ApiErrorCode;
use crate::http::handlers::{
    api_error_response, error_json, make_request_id, store_failure, with_request_id,
};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use babbu_feeder_model::WeightEntry;
use babbu_feeder_store::{NewFood, StoreErrorCode};
use serde_json::json;
use std::time::Instant;
use tracing::info;

pub(crate) async fn weights_handler(State(state): State<AppState>) -> impl IntoResponse {
    let request_id = make_request_id(&state);
    let started = Instant::now();
    let (status, resp) = match state.documents.weight_log().await {
        Ok(log) => (
            StatusCode::OK,
            Json(json!({"weights": log.weights})).into_response(),
        ),
        Err(err) => {
            let resp = store_failure(&err);
            (resp.status(), resp)
        }
    };
    state
        .metrics
        .observe_request("/v1/weights", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

pub(crate) async fn add_weight_handler(
    State(state): State<AppState>,
    Json(entry): Json<WeightEntry>,
) -> impl IntoResponse {
    let request_id = make_request_id(&state);
    let started = Instant::now();
    if let Err(e) = entry.validate() {
        let resp = api_error_response(
            StatusCode::BAD_REQUEST,
            error_json(ApiErrorCode::ValidationFailed, &e.to_string(), json!({})),
        );
        state
            .metrics
            .observe_request("/v1/weights", StatusCode::BAD_REQUEST, started.elapsed())
            .await;
        return with_request_id(resp, &request_id);
    }
    let (status, resp) = match state.documents.record_weight(entry).await {
        Ok(log) => {
            info!(request_id = %request_id, dt = %entry.dt, "weight recorded");
            (
                StatusCode::OK,
                Json(json!({"weights": log.weights})).into_response(),
            )
        }
        Err(err) => {
            let resp = store_failure(&err);
            (resp.status(), resp)
        }
    };
    state
        .metrics
        .observe_request("/v1/weights", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

pub(crate) async fn foods_handler(State(state): State<AppState>) -> impl IntoResponse {
    let request_id = make_request_id(&state);
    let started = Instant::now();
    let (status, resp) = match state.documents.food_catalog().await {
        Ok(foods) => (
            StatusCode::OK,
            Json(json!({"foods": foods})).into_response(),
        ),
        Err(err) => {
            let resp = store_failure(&err);
            (resp.status(), resp)
        }
    };
    state
        .metrics
        .observe_request("/v1/foods", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

pub(crate) async fn add_food_handler(
    State(state): State<AppState>,
    Json(new_food): Json<NewFood>,
) -> impl IntoResponse {
    let request_id = make_request_id(&state);
    let started = Instant::now();
    let (status, resp) = match state.documents.add_food(new_food).await {
        Ok(item) => {
            info!(request_id = %request_id, food_id = item.id, "food added");
            (StatusCode::CREATED, Json(item).into_response())
        }
        Err(err) if err.code == StoreErrorCode::Validation => {
            let resp = api_error_response(
                StatusCode::BAD_REQUEST,
                error_json(ApiErrorCode::ValidationFailed, &err.message, json!({})),
            );
            (StatusCode::BAD_REQUEST, resp)
        }
        Err(err) => {
            let resp = store_failure(&err);
            (resp.status(), resp)
        }
    };
    state
        .metrics
        .observe_request("/v1/foods", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}

pub(crate) async fn delete_food_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let request_id = make_request_id(&state);
    let started = Instant::now();
    let (status, resp) = match state.documents.remove_food(id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({"deleted": true, "id": id})).into_response(),
        ),
        Ok(false) => {
            let resp = api_error_response(
                StatusCode::NOT_FOUND,
                error_json(
                    ApiErrorCode::NotFound,
                    &format!("no food with id {id}"),
                    json!({"id": id}),
                ),
            );
            (StatusCode::NOT_FOUND, resp)
        }
        Err(err) => {
            let resp = store_failure(&err);
            (resp.status(), resp)
        }
    };
    state
        .metrics
        .observe_request("/v1/foods/{id}", status, started.elapsed())
        .await;
    with_request_id(resp, &request_id)
}
