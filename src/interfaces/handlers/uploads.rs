use std::io;

use actix_web::{web, HttpResponse};

use crate::{errors::ApiError, utils::secure_filename::secure_filename, AppState};

/// Serves a stored upload so the generation service can fetch it.
pub async fn uploaded_file(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let file_name = path.into_inner();

    // Stored names are always already sanitized, so anything else is a probe
    if file_name.is_empty() || secure_filename(&file_name) != file_name {
        return Err(ApiError::NotFound(file_name));
    }

    let full_path = state.upload_handler.upload_dir().join(&file_name);
    let bytes = match tokio::fs::read(&full_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ApiError::NotFound(file_name)),
        Err(e) => return Err(ApiError::InternalError(e.to_string())),
    };

    let content_type = infer::get(&bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or("application/octet-stream");

    tracing::debug!(file = %file_name, content_type, "Serving uploaded image");

    Ok(HttpResponse::Ok().content_type(content_type).body(bytes))
}
