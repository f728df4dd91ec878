use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use validator::{Validate, ValidationError};

use crate::error::{AdcError, AdcResult};
use crate::validation::validate_model;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub upload: UploadConfig,
    pub extraction: ExtractionConfig,
    pub nlu: NluConfig,
    pub rules: RulesConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for a whole multipart body. Must leave room above
    /// `upload.max_file_size` so oversized files still reach validation.
    pub max_request_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AuthConfig {
    #[validate(length(min = 1))]
    pub header: String,
    #[validate(length(min = 1))]
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_upload_limits"))]
pub struct UploadConfig {
    #[validate(length(min = 1))]
    pub tmp_dir: String,
    pub max_file_size: u64,
    #[validate(length(min = 1))]
    pub accepted_mime_types: Vec<String>,
    #[validate(length(min = 1))]
    pub output_types: Vec<String>,
    pub default_output: String,
}

fn validate_upload_limits(config: &UploadConfig) -> Result<(), ValidationError> {
    if config.max_file_size == 0 {
        return Err(ValidationError::new("max_file_size"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_page_range"))]
pub struct ExtractionConfig {
    /// 1-based, inclusive.
    pub first_page: u32,
    pub last_page: u32,
    pub max_words: usize,
}

fn validate_page_range(config: &ExtractionConfig) -> Result<(), ValidationError> {
    if config.first_page == 0 {
        return Err(ValidationError::new("first_page"));
    }
    if config.first_page > config.last_page {
        return Err(ValidationError::new("page_range"));
    }
    if config.max_words == 0 {
        return Err(ValidationError::new("max_words"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NluConfig {
    #[validate(length(min = 1))]
    pub url: String,
    pub version: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_key: Option<String>,
    #[validate(length(min = 1))]
    pub entity_type: String,
    pub entity_limit: u32,
    pub keyword_limit: u32,
    pub emotion: bool,
    pub sentiment: bool,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    pub entity_types_path: String,
    pub entity_names_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let config = Config::builder()
            // Start with compiled-in defaults so partial files are enough
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name("config/default").required(false))
            // Add environment-specific config
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // Add local config (gitignored)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with ADC prefix
            .add_source(Environment::with_prefix("ADC").separator("__"))
            // Bare variables understood by older deployments
            .set_override_option("server.port", env::var("PORT").ok())?
            .set_override_option("auth.secret", env::var("TDNS_SECRET").ok())?;

        config.build()?.try_deserialize()
    }

    pub fn validate(&self) -> AdcResult<()> {
        if self.server.max_request_size as u64 <= self.upload.max_file_size {
            return Err(AdcError::configuration(
                "server.max_request_size must be greater than upload.max_file_size",
            ));
        }
        validate_model(&self.auth)?;
        validate_model(&self.upload)?;
        validate_model(&self.extraction)?;
        validate_model(&self.nlu)?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                max_request_size: 32 * 1024 * 1024, // 32MB
            },
            auth: AuthConfig {
                header: "key".to_string(),
                secret: "topsecret".to_string(),
            },
            upload: UploadConfig {
                tmp_dir: "tmp".to_string(),
                max_file_size: 20 * 1000 * 1000, // 20mb
                accepted_mime_types: vec![
                    "image/png".to_string(),
                    "image/jpeg".to_string(),
                    "application/pdf".to_string(),
                ],
                output_types: vec!["pdf".to_string(), "text".to_string()],
                default_output: "text".to_string(),
            },
            extraction: ExtractionConfig {
                first_page: 2,
                last_page: 4,
                max_words: 500,
            },
            nlu: NluConfig {
                url: "https://gateway.watsonplatform.net/natural-language-understanding/api"
                    .to_string(),
                version: "2018-03-16".to_string(),
                username: None,
                password: None,
                api_key: None,
                entity_type: "Company".to_string(),
                entity_limit: 2,
                keyword_limit: 2,
                emotion: true,
                sentiment: true,
                timeout_seconds: 30,
            },
            rules: RulesConfig {
                entity_types_path: "config/entity_types.properties".to_string(),
                entity_names_path: "config/entity_names.properties".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
                file_path: None,
            },
        }
    }
}
