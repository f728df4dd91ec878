//! Prometheus counters for the upload endpoint.

use adc_models::MatchSource;
use adc_utils::{AdcError, AdcResult};
use prometheus::{IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    uploads: IntCounterVec,
    classifications: IntCounterVec,
}

impl Metrics {
    pub fn new() -> AdcResult<Self> {
        let registry = Registry::new();

        let uploads = IntCounterVec::new(
            Opts::new("adc_uploads_total", "Uploads received, by outcome"),
            &["outcome"],
        )
        .map_err(metrics_error)?;
        let classifications = IntCounterVec::new(
            Opts::new(
                "adc_classifications_total",
                "PDF classifications, by the rule that produced the label",
            ),
            &["matched_by"],
        )
        .map_err(metrics_error)?;

        registry
            .register(Box::new(uploads.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(classifications.clone()))
            .map_err(metrics_error)?;

        Ok(Self {
            registry,
            uploads,
            classifications,
        })
    }

    pub fn record_upload(&self, outcome: &str) {
        self.uploads.with_label_values(&[outcome]).inc();
    }

    pub fn record_classification(&self, source: MatchSource) {
        self.classifications
            .with_label_values(&[source.as_str()])
            .inc();
    }

    pub fn encode(&self) -> String {
        TextEncoder::new()
            .encode_to_string(&self.registry.gather())
            .unwrap_or_else(|_| "Error encoding metrics".to_string())
    }
}

fn metrics_error(error: prometheus::Error) -> AdcError {
    AdcError::internal(format!("metrics registration failed: {}", error))
}
