//! Natural Language Understanding wire types (Watson NLU v1 `analyze`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
    pub features: Features,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Features {
    pub entities: FeatureOptions,
    pub keywords: FeatureOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureOptions {
    pub emotion: bool,
    pub sentiment: bool,
    pub limit: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub language: Option<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub text: String,
    #[serde(default)]
    pub relevance: f64,
    pub count: Option<u32>,
    pub sentiment: Option<Sentiment>,
    pub emotion: Option<Emotion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub text: String,
    #[serde(default)]
    pub relevance: f64,
    pub sentiment: Option<Sentiment>,
    pub emotion: Option<Emotion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub score: f64,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emotion {
    pub sadness: f64,
    pub joy: f64,
    pub fear: f64,
    pub disgust: f64,
    pub anger: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub text_units: Option<u32>,
    pub text_characters: Option<u32>,
    pub features: Option<u32>,
}
