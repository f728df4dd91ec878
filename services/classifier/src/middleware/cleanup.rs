use axum::{extract::Request, middleware::Next, response::Response};
use tracing::error;

use crate::staging::{remove_staging_dir, StagingDir};

/// Removes the staging directory a handler attached to its response.
pub async fn cleanup_middleware(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    if let Some(StagingDir(dir)) = response.extensions().get::<StagingDir>() {
        if let Err(e) = remove_staging_dir(dir).await {
            error!(error = %e, dir = %dir.display(), "Failed to remove staging directory");
        }
    }

    response
}
