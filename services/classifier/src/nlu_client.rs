//! NLU (Natural Language Understanding) Client
//!
//! Sends document text to a Watson NLU compatible `analyze` endpoint and
//! returns the detected entities and keywords.

use adc_models::{AnalysisResponse, AnalyzeRequest, FeatureOptions, Features};
use adc_utils::{AdcError, AdcResult, NluConfig};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const SERVICE: &str = "NLU";

/// Entity analysis backend.
#[async_trait]
pub trait EntityAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> AdcResult<AnalysisResponse>;
}

#[derive(Debug, Clone)]
enum Credentials {
    ApiKey(String),
    Basic { username: String, password: Option<String> },
    Anonymous,
}

/// HTTP client for the NLU service
pub struct NluClient {
    client: Client,
    endpoint: String,
    version: String,
    credentials: Credentials,
    features: Features,
}

impl NluClient {
    pub fn new(config: &NluConfig) -> AdcResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AdcError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        // Empty values come from blank env vars and mean "not set".
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

        let credentials = match (non_empty(&config.api_key), non_empty(&config.username)) {
            (Some(api_key), _) => Credentials::ApiKey(api_key),
            (None, Some(username)) => Credentials::Basic {
                username,
                password: non_empty(&config.password),
            },
            (None, None) => {
                warn!("No NLU credentials configured; requests will be sent unauthenticated");
                Credentials::Anonymous
            }
        };

        Ok(Self {
            client,
            endpoint: format!("{}/v1/analyze", config.url.trim_end_matches('/')),
            version: config.version.clone(),
            credentials,
            features: Features {
                entities: FeatureOptions {
                    emotion: config.emotion,
                    sentiment: config.sentiment,
                    limit: config.entity_limit,
                },
                keywords: FeatureOptions {
                    emotion: config.emotion,
                    sentiment: config.sentiment,
                    limit: config.keyword_limit,
                },
            },
        })
    }
}

#[async_trait]
impl EntityAnalyzer for NluClient {
    async fn analyze(&self, text: &str) -> AdcResult<AnalysisResponse> {
        let request = AnalyzeRequest {
            text: text.to_string(),
            features: self.features.clone(),
        };

        let builder = self
            .client
            .post(&self.endpoint)
            .query(&[("version", self.version.as_str())])
            .json(&request);

        let builder = match &self.credentials {
            Credentials::ApiKey(key) => builder.basic_auth("apikey", Some(key)),
            Credentials::Basic { username, password } => {
                builder.basic_auth(username, password.as_ref())
            }
            Credentials::Anonymous => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| AdcError::external_service(SERVICE, format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AdcError::external_service(
                SERVICE,
                format!("{}: {}", status, error_text),
            ));
        }

        let analysis: AnalysisResponse = response.json().await.map_err(|e| {
            AdcError::external_service(SERVICE, format!("invalid response body: {}", e))
        })?;

        debug!(
            entities = analysis.entities.len(),
            keywords = analysis.keywords.len(),
            "NLU analysis complete"
        );

        Ok(analysis)
    }
}
