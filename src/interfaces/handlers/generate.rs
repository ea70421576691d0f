use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::{
    entities::{generation::GenerateResponse, upload::GenerateUpload},
    errors::{ApiError, UploadError},
    utils::public_url::image_url,
    AppState,
};

/// Accepts an image and prompt, runs the generation task to completion and
/// reports the outcome.
///
/// The stored upload is removed before returning on every path; if this
/// future is dropped mid-flight the upload's guard removes it instead.
pub async fn generate_video(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: Result<MultipartForm<GenerateUpload>, actix_web::Error>,
) -> Result<HttpResponse, ApiError> {
    let form = form.map_err(UploadError::from)?.into_inner();
    let prompt_text = form.prompt_text();

    let image = state.upload_handler.store(form.file).await?;
    let url = image_url(&req, state.config.public_base_url.as_deref(), image.file_name())?;

    tracing::info!(
        image_url = %url,
        aspect_ratio = %image.aspect_ratio(),
        "Starting video generation"
    );

    let outcome = state
        .generation_handler
        .generate(url.as_str(), image.aspect_ratio(), &prompt_text)
        .await;

    let file_name = image.file_name().to_string();
    if let Err(e) = image.remove().await {
        tracing::warn!(file = %file_name, error = %e, "Failed to remove uploaded image");
    }

    let task_info = outcome?;

    Ok(HttpResponse::Ok().json(GenerateResponse::Success { task_info }))
}
