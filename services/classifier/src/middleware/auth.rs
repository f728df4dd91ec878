use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use adc_utils::AdcError;
use tracing::debug;

use crate::AppState;

/// Shared-secret check: the configured header must carry the configured secret.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AdcError> {
    let auth = &state.config.auth;
    let provided = headers
        .get(auth.header.as_str())
        .and_then(|header| header.to_str().ok());

    match provided {
        Some(key) if key == auth.secret => Ok(next.run(request).await),
        Some(_) => {
            debug!(path = %request.uri().path(), "Rejected request with wrong key");
            Err(AdcError::authentication("Invalid key"))
        }
        None => {
            debug!(path = %request.uri().path(), "Rejected request without key");
            Err(AdcError::authentication(format!(
                "Missing {} header",
                auth.header
            )))
        }
    }
}
