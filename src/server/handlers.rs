//! HTTP request handlers

use std::sync::Arc;
use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::advice::{self, Advice};
use crate::inference::{HealthStatus, Prediction, SchemaInfo};
use crate::intake::SymptomForm;
use crate::schema::FeatureMap;

use super::error::{Result, ServerError};
use super::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(state.engine.health())
}

pub async fn schema(State(state): State<Arc<AppState>>) -> Json<SchemaInfo> {
    Json(state.engine.schema())
}

/// `POST /predict` with `{"features": {...}}`.
///
/// The body is read as JSON whatever its content type. A missing or null
/// `features` key predicts from all defaults.
pub async fn predict(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Json<Prediction>> {
    let features = parse_features(&body)?;
    let prediction = run_prediction(state, features).await?;
    info!(
        prediction = %prediction.prediction,
        confidence = prediction.confidence,
        method = ?prediction.explanation.method,
        "Prediction request served"
    );
    Ok(Json(prediction))
}

/// `POST /predict/form` with a [`SymptomForm`]
pub async fn predict_form(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Json<Prediction>> {
    let form: SymptomForm = serde_json::from_slice(&body)?;
    let features = state.intake.to_feature_map(&form, &state.engine.bundle().schema);
    let prediction = run_prediction(state, features).await?;
    info!(
        prediction = %prediction.prediction,
        confidence = prediction.confidence,
        "Form prediction served"
    );
    Ok(Json(prediction))
}

/// `GET /advice/:disease`, falling back to the generic entry
pub async fn advice(Path(disease): Path<String>) -> Json<&'static Advice> {
    Json(advice::lookup(&disease))
}

/// Forest traversal and Shapley sampling are CPU bound, so they run off the
/// async workers
async fn run_prediction(state: Arc<AppState>, features: FeatureMap) -> Result<Prediction> {
    let prediction = tokio::task::spawn_blocking(move || state.engine.predict(&features))
        .await
        .map_err(|e| ServerError::Internal(format!("prediction task failed: {}", e)))??;
    Ok(prediction)
}

fn parse_features(body: &[u8]) -> Result<FeatureMap> {
    let payload: Value = serde_json::from_slice(body)?;
    let Value::Object(mut payload) = payload else {
        return Err(ServerError::BadRequest("request body must be a JSON object".to_string()));
    };
    match payload.remove("features") {
        None | Some(Value::Null) => Ok(FeatureMap::new()),
        Some(Value::Object(features)) => Ok(features),
        Some(_) => Err(ServerError::BadRequest("\"features\" must be an object".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_features() {
        let map = parse_features(br#"{"features": {"Age": 40}}"#).unwrap();
        assert_eq!(map["Age"], 40);

        assert!(parse_features(br#"{}"#).unwrap().is_empty());
        assert!(parse_features(br#"{"features": null}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_features_rejects() {
        assert!(parse_features(b"").is_err());
        assert!(parse_features(b"not json").is_err());
        assert!(parse_features(b"[1, 2]").is_err());
        assert!(parse_features(br#"{"features": [1]}"#).is_err());
    }
}
