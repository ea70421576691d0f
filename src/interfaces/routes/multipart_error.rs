use actix_multipart::{
    form::{
        tempfile::{TempFileConfig, TempFileError},
        MultipartFormConfig,
    },
    MultipartError,
};
use actix_web::web;

use crate::{errors::UploadError, settings::AppConfig};

/// Registers multipart limits and maps extractor failures onto the
/// `{status: "error"}` envelope.
pub fn config_routes(config: &AppConfig) -> impl FnOnce(&mut web::ServiceConfig) {
    let form_config = MultipartFormConfig::default()
        .total_limit(config.max_upload_bytes)
        .memory_limit(config.max_upload_bytes)
        .error_handler(|err, _req| multipart_error(err));

    // Staging temp files next to their destination keeps the final move a rename
    let temp_file_config = TempFileConfig::default()
        .directory(&config.upload_dir)
        .error_handler(|err, _req| temp_file_error(err));

    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(form_config).app_data(temp_file_config);
    }
}

fn multipart_error(err: MultipartError) -> actix_web::Error {
    UploadError::from(err).into()
}

fn temp_file_error(err: TempFileError) -> actix_web::Error {
    UploadError::from(err).into()
}
