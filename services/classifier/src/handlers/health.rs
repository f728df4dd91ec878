use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let rules = state.classifier.rules();

    Json(json!({
        "status": "healthy",
        "service": "adc-classifier",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "rules": {
            "entity_types": rules.pattern_count(),
            "entity_names": rules.name_count()
        }
    }))
}

pub async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.encode()
}
