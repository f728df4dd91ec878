use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum AdcError {
    #[error("{message}")]
    Validation {
        message: String,
        valid_mime_types: Option<Vec<String>>,
        valid_output_types: Option<Vec<String>>,
    },

    #[error("Authentication error: {message}")]
    Authentication { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Staging error: {message}")]
    Staging { message: String },

    #[error("Document processing error: {message}")]
    DocumentProcessing { message: String },

    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl AdcError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            valid_mime_types: None,
            valid_output_types: None,
        }
    }

    pub fn invalid_mime_type(mime_type: &str, accepted: &[String]) -> Self {
        Self::Validation {
            message: format!("{} is not a valid MIME type.", mime_type),
            valid_mime_types: Some(accepted.to_vec()),
            valid_output_types: None,
        }
    }

    pub fn invalid_output_type(output: &str, accepted: &[String]) -> Self {
        Self::Validation {
            message: format!("{} is not a valid output type.", output),
            valid_mime_types: None,
            valid_output_types: Some(accepted.to_vec()),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn staging(message: impl Into<String>) -> Self {
        Self::Staging {
            message: message.into(),
        }
    }

    pub fn document_processing(message: impl Into<String>) -> Self {
        Self::DocumentProcessing {
            message: message.into(),
        }
    }

    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Authentication { .. } => "AUTHENTICATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Staging { .. } => "STAGING_ERROR",
            Self::DocumentProcessing { .. } => "DOCUMENT_PROCESSING_ERROR",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Validation failures are reported through the generic error handler,
    /// which answers 500 for every error it receives.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Authentication { .. } => 401,
            Self::NotFound { .. } => 404,
            Self::Validation { .. }
            | Self::Staging { .. }
            | Self::DocumentProcessing { .. }
            | Self::ExternalService { .. }
            | Self::Configuration { .. }
            | Self::Internal { .. } => 500,
        }
    }
}

pub type AdcResult<T> = Result<T, AdcError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
    #[serde(rename = "validMIMETypes", skip_serializing_if = "Option::is_none")]
    pub valid_mime_types: Option<Vec<String>>,
    #[serde(rename = "validOutputTypes", skip_serializing_if = "Option::is_none")]
    pub valid_output_types: Option<Vec<String>>,
}

impl From<AdcError> for ErrorResponse {
    fn from(error: AdcError) -> Self {
        let code = error.error_code().to_string();
        match error {
            AdcError::Validation {
                message,
                valid_mime_types,
                valid_output_types,
            } => Self {
                message,
                code,
                valid_mime_types,
                valid_output_types,
            },
            // Filesystem details stay in the logs.
            AdcError::Staging { .. } => Self {
                message: "server error".to_string(),
                code,
                valid_mime_types: None,
                valid_output_types: None,
            },
            other => Self {
                message: other.to_string(),
                code,
                valid_mime_types: None,
                valid_output_types: None,
            },
        }
    }
}

impl IntoResponse for AdcError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match self {
            Self::Authentication { .. } => (status, "unauthorized").into_response(),
            Self::NotFound { .. } => (status, "resource not found").into_response(),
            other => (status, Json(ErrorResponse::from(other))).into_response(),
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for AdcError {
    fn from(error: std::io::Error) -> Self {
        Self::staging(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_answers_500() {
        let error = AdcError::validation("file exceeds limit of 20mb");
        assert_eq!(error.error_code(), "VALIDATION_ERROR");
        assert_eq!(error.http_status_code(), 500);
        assert_eq!(error.to_string(), "file exceeds limit of 20mb");
    }

    #[test]
    fn test_invalid_mime_type_lists_accepted_types() {
        let accepted = vec!["image/png".to_string(), "application/pdf".to_string()];
        let body = ErrorResponse::from(AdcError::invalid_mime_type("text/plain", &accepted));

        assert_eq!(body.message, "text/plain is not a valid MIME type.");
        assert_eq!(body.valid_mime_types, Some(accepted));
        assert!(body.valid_output_types.is_none());

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("validMIMETypes").is_some());
        assert!(json.get("validOutputTypes").is_none());
    }

    #[test]
    fn test_staging_error_hides_details() {
        let body = ErrorResponse::from(AdcError::staging("permission denied: /tmp/_abc"));
        assert_eq!(body.message, "server error");
        assert_eq!(body.code, "STAGING_ERROR");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AdcError::authentication("missing key").http_status_code(), 401);
        assert_eq!(AdcError::not_found("/nope").http_status_code(), 404);
        assert_eq!(
            AdcError::external_service("NLU", "timeout").http_status_code(),
            500
        );
    }
}
