//! REST API over the model store and training controller.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use metrics::counter;
use serde_json::json;
use tracing::warn;

use reef_core::ModelId;
use reef_store::{ModelRecord, StoreError};
use reef_training::{ModelMetricsReport, TrainingError, TrainingProgress, TrainingRunConfig};

use crate::metrics::TRAINING_JOBS_TOTAL;
use crate::server::AppState;

/// API error rendered as `{"error": message}` with a matching status code.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status.
    pub status: StatusCode,
    /// Human-readable message.
    pub message: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<TrainingError> for ApiError {
    fn from(err: TrainingError) -> Self {
        let status = match &err {
            TrainingError::ModelNotFound(_) => StatusCode::NOT_FOUND,
            TrainingError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            TrainingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            warn!(error = %err, "training operation failed");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let status = match &err {
            StoreError::ModelNotFound(_) => StatusCode::NOT_FOUND,
            _ => {
                warn!(error = %err, "store operation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// GET `/api/models`
pub async fn list_models(State(state): State<AppState>) -> Result<Json<Vec<ModelRecord>>, ApiError> {
    Ok(Json(state.store.list_models()?))
}

/// GET `/api/models/{id}`
pub async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ModelRecord>, ApiError> {
    let id = ModelId::from_string(id);
    let record = state
        .store
        .get_model(&id)?
        .ok_or_else(|| ApiError::not_found(format!("model not found: {id}")))?;
    Ok(Json(record))
}

/// GET `/api/models/{id}/metrics`
pub async fn model_metrics(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ModelMetricsReport>, ApiError> {
    let id = ModelId::from_string(id);
    Ok(Json(state.controller.metrics_report(&id)?))
}

/// GET `/api/training`
pub async fn active_training(State(state): State<AppState>) -> Json<Vec<TrainingProgress>> {
    Json(state.controller.active_jobs().await)
}

/// POST `/api/training/start`
pub async fn start_training(
    State(state): State<AppState>,
    Json(config): Json<TrainingRunConfig>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let id = state.controller.start(config).await?;
    counter!(TRAINING_JOBS_TOTAL).increment(1);
    Ok((StatusCode::CREATED, Json(json!({ "modelId": id }))))
}

/// GET `/api/training/{id}`
pub async fn training_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TrainingProgress>, ApiError> {
    let id = ModelId::from_string(id);
    let progress = state
        .controller
        .progress(&id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("no active job: {id}")))?;
    Ok(Json(progress))
}

/// POST `/api/training/{id}/stop`
pub async fn stop_training(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<serde_json::Value> {
    let id = ModelId::from_string(id);
    let stopped = state.controller.stop(&id).await;
    Json(json!({ "modelId": id, "stopped": stopped }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn training_errors_map_to_statuses() {
        let not_found: ApiError = TrainingError::ModelNotFound("x".into()).into();
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);

        let invalid: ApiError = TrainingError::InvalidConfig("bad".into()).into();
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

        let store: ApiError =
            TrainingError::Store(StoreError::ModelNotFound("x".into())).into();
        assert_eq!(store.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn store_errors_map_to_statuses() {
        let not_found: ApiError = StoreError::ModelNotFound("x".into()).into();
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);

        let migration: ApiError = StoreError::Migration {
            message: "boom".into(),
        }
        .into();
        assert_eq!(migration.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
