use adc_models::EntityRules;
use adc_utils::{AdcResult, AppConfig};
use axum::{
    extract::DefaultBodyLimit,
    http::{header::HeaderName, HeaderValue},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::classification::DocumentClassifier;
use crate::handlers::*;
use crate::metrics::Metrics;
use crate::middleware::*;
use crate::nlu_client::EntityAnalyzer;
use crate::pdf_processor::TextExtractor;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub classifier: DocumentClassifier,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        rules: EntityRules,
        extractor: Arc<dyn TextExtractor>,
        analyzer: Arc<dyn EntityAnalyzer>,
    ) -> AdcResult<Self> {
        let classifier = DocumentClassifier::new(
            Arc::new(rules),
            extractor,
            analyzer,
            &config.extraction,
            config.nlu.entity_type.clone(),
        );

        Ok(Self {
            config: Arc::new(config),
            classifier,
            metrics: Metrics::new()?,
        })
    }
}

const SECURITY_HEADERS: [(&str, &str); 5] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-xss-protection", "1; mode=block"),
];

pub fn create_app(state: AppState) -> Router {
    // Everything except health and metrics sits behind the shared secret,
    // including the 404 fallback.
    let protected = Router::new()
        .route("/api/adc", post(classify_upload).fallback(not_found))
        .fallback(not_found)
        .layer(axum::middleware::from_fn(cleanup_middleware))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(state.config.server.max_request_size))
                .layer(axum::middleware::from_fn(request_id_middleware)),
        );

    for (name, value) in SECURITY_HEADERS {
        app = app.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ));
    }

    app.with_state(state)
}
