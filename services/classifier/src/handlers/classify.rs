use adc_models::{OutputType, PDF_MIME_TYPE};
use adc_utils::{
    file_too_large, log_error, validate_file_size, validate_mime_type, validate_output_type,
    AdcError, AdcResult, UploadConfig,
};
use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use std::path::Path;
use tracing::{debug, info};

use crate::staging::{stage_upload, StagedUpload, StagingDir};
use crate::AppState;

pub const UNSUPPORTED_MESSAGE: &str = "Non PDF file is not supported.";

/// File part of the upload form
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    /// Bytes received for the part. Reading stops once this passes the
    /// upload limit, so `data` is empty for oversized files.
    pub size: u64,
    pub data: Bytes,
}

#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub output: Option<String>,
    /// A second part carrying a file under the `file` name.
    pub extra_file: bool,
}

impl UploadForm {
    /// Collect the `file` and `output` fields; other fields are ignored.
    ///
    /// A `file` part without a filename is not a file upload and is skipped.
    /// Reading stops at the first file part that grows past `max_file_size`.
    pub async fn from_multipart(mut multipart: Multipart, max_file_size: u64) -> AdcResult<Self> {
        let mut form = Self::default();

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| upload_error(e, max_file_size))?
        {
            let name = field.name().map(str::to_string);
            let filename = field.file_name().map(str::to_string);

            match (name.as_deref(), filename) {
                (Some("file"), Some(_)) if form.file.is_some() => {
                    form.extra_file = true;
                }
                (Some("file"), Some(filename)) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();

                    let mut size: u64 = 0;
                    let mut data = Vec::new();
                    while let Some(chunk) = field
                        .chunk()
                        .await
                        .map_err(|e| upload_error(e, max_file_size))?
                    {
                        size += chunk.len() as u64;
                        if size > max_file_size {
                            break;
                        }
                        data.extend_from_slice(&chunk);
                    }

                    let oversized = size > max_file_size;
                    form.file = Some(UploadedFile {
                        filename,
                        content_type,
                        size,
                        data: if oversized { Bytes::new() } else { Bytes::from(data) },
                    });

                    if oversized {
                        debug!(max_file_size, "Upload over the size limit, skipping the rest");
                        break;
                    }
                }
                (Some("output"), _) => {
                    let output = field
                        .text()
                        .await
                        .map_err(|e| upload_error(e, max_file_size))?;
                    form.output = Some(output);
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Checks run in a fixed order; the first failure is reported.
    pub fn validate(self, config: &UploadConfig) -> AdcResult<(UploadedFile, OutputType)> {
        let file = self
            .file
            .ok_or_else(|| AdcError::validation("no image found in file field"))?;

        validate_mime_type(&file.content_type, &config.accepted_mime_types)?;
        validate_output_type(self.output.as_deref(), &config.output_types)?;
        validate_file_size(file.size, config.max_file_size)?;

        if self.extra_file {
            return Err(AdcError::validation("unexpected field: file"));
        }

        let requested = self.output.as_deref().unwrap_or(&config.default_output);
        let output = requested
            .parse::<OutputType>()
            .map_err(|other| AdcError::invalid_output_type(&other, &config.output_types))?;

        Ok((file, output))
    }
}

/// A body cut off by the request limit can only be an oversized file.
fn upload_error(error: MultipartError, max_file_size: u64) -> AdcError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return file_too_large(max_file_size);
    }
    AdcError::validation(format!("Upload error: {}", error))
}

/// `POST /api/adc`
pub async fn classify_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let (file, output) = match read_upload(&state, multipart).await {
        Ok(upload) => upload,
        Err(e) => {
            info!(reason = %e, "Upload rejected");
            state.metrics.record_upload("rejected");
            return e.into_response();
        }
    };

    let staged = match stage_upload(Path::new(&state.config.upload.tmp_dir), &file.data).await {
        Ok(staged) => staged,
        Err(e) => {
            log_error!(e, "Failed to stage upload");
            state.metrics.record_upload("failed");
            return e.into_response();
        }
    };

    let mut response = match respond(&state, &file, &staged, output).await {
        Ok(response) => response,
        Err(e) => {
            log_error!(e, "Document classification failed");
            state.metrics.record_upload("failed");
            e.into_response()
        }
    };

    response.extensions_mut().insert(StagingDir(staged.dir));
    response
}

async fn read_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> AdcResult<(UploadedFile, OutputType)> {
    // A body that is not multipart at all simply carries no file.
    let form = match multipart {
        Ok(multipart) => {
            UploadForm::from_multipart(multipart, state.config.upload.max_file_size).await?
        }
        Err(_) => UploadForm::default(),
    };

    form.validate(&state.config.upload)
}

async fn respond(
    state: &AppState,
    file: &UploadedFile,
    staged: &StagedUpload,
    output: OutputType,
) -> AdcResult<Response> {
    if file.content_type != PDF_MIME_TYPE {
        info!(content_type = %file.content_type, "Non PDF upload");
        state.metrics.record_upload("unsupported");
        return Ok((StatusCode::OK, UNSUPPORTED_MESSAGE).into_response());
    }

    let result = state
        .classifier
        .classify(&file.filename, &staged.path, output)
        .await?;

    state.metrics.record_upload("classified");
    state.metrics.record_classification(result.matched_by);

    Ok(Json(result).into_response())
}

/// Fallback for every unknown path.
pub async fn not_found(uri: Uri) -> AdcError {
    AdcError::not_found(uri.path())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(content_type: &str, size: usize) -> UploadedFile {
        UploadedFile {
            filename: "report.pdf".to_string(),
            content_type: content_type.to_string(),
            size: size as u64,
            data: Bytes::from(vec![0u8; size]),
        }
    }

    fn config() -> UploadConfig {
        let mut config = adc_utils::AppConfig::default().upload;
        config.max_file_size = 100;
        config
    }

    #[test]
    fn test_missing_file_reported_first() {
        let form = UploadForm {
            file: None,
            output: Some("docx".to_string()),
            ..Default::default()
        };
        let err = form.validate(&config()).unwrap_err();
        assert_eq!(err.to_string(), "no image found in file field");
    }

    #[test]
    fn test_mime_checked_before_output_and_size() {
        let form = UploadForm {
            file: Some(file("text/plain", 1000)),
            output: Some("docx".to_string()),
            ..Default::default()
        };
        let err = form.validate(&config()).unwrap_err();
        assert_eq!(err.to_string(), "text/plain is not a valid MIME type.");
    }

    #[test]
    fn test_output_checked_before_size() {
        let form = UploadForm {
            file: Some(file("application/pdf", 1000)),
            output: Some("docx".to_string()),
            ..Default::default()
        };
        let err = form.validate(&config()).unwrap_err();
        assert_eq!(err.to_string(), "docx is not a valid output type.");
    }

    #[test]
    fn test_default_output_is_text() {
        let form = UploadForm {
            file: Some(file("image/png", 10)),
            output: None,
            ..Default::default()
        };
        let (_, output) = form.validate(&config()).unwrap();
        assert_eq!(output, OutputType::Text);
    }

    #[test]
    fn test_second_file_checked_after_size() {
        let form = UploadForm {
            file: Some(file("application/pdf", 1000)),
            extra_file: true,
            ..Default::default()
        };
        let err = form.validate(&config()).unwrap_err();
        assert_eq!(err.to_string(), "file exceeds limit of 0mb");

        let form = UploadForm {
            file: Some(file("text/plain", 10)),
            extra_file: true,
            ..Default::default()
        };
        let err = form.validate(&config()).unwrap_err();
        assert_eq!(err.to_string(), "text/plain is not a valid MIME type.");

        let form = UploadForm {
            file: Some(file("application/pdf", 10)),
            extra_file: true,
            ..Default::default()
        };
        let err = form.validate(&config()).unwrap_err();
        assert_eq!(err.to_string(), "unexpected field: file");
    }
}
