use std::io;

use actix_multipart::{form::tempfile::TempFileError, MultipartError};
use actix_web::{
    error::{PayloadError, ResponseError},
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use derive_more::Display;
use tokio::time::Duration;

use crate::entities::generation::GenerateResponse;

/// Rejections raised while accepting and storing an uploaded image.
#[derive(Debug, Display)]
pub enum UploadError {
    #[display("No file part")]
    NoFilePart,

    #[display("No selected file")]
    NoSelectedFile,

    #[display("Invalid file type")]
    InvalidFileType,

    #[display("File too large")]
    PayloadTooLarge,

    #[display("Invalid image file")]
    InvalidImage(String),

    #[display("Failed to store uploaded file")]
    Storage(io::Error),
}

impl ResponseError for UploadError {
    fn error_response(&self) -> HttpResponse {
        error_body(self.status_code(), self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            UploadError::NoFilePart
            | UploadError::NoSelectedFile
            | UploadError::InvalidFileType
            | UploadError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            UploadError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<io::Error> for UploadError {
    fn from(err: io::Error) -> Self {
        UploadError::Storage(err)
    }
}

impl From<MultipartError> for UploadError {
    fn from(err: MultipartError) -> Self {
        match err {
            MultipartError::Payload(PayloadError::Overflow) => UploadError::PayloadTooLarge,
            MultipartError::Field { source, .. } => UploadError::from(source),
            other => {
                tracing::debug!(error = %other, "Multipart form rejected");
                UploadError::NoFilePart
            }
        }
    }
}

impl From<TempFileError> for UploadError {
    fn from(err: TempFileError) -> Self {
        tracing::error!(error = %err, "Failed to write upload to temp file");
        match err {
            TempFileError::FileIo(e) => UploadError::Storage(e),
            other => UploadError::Storage(io::Error::other(other.to_string())),
        }
    }
}

/// Recovers the upload rejection carried by a failed form extraction.
/// Anything else, such as a body that is not multipart, has no file part.
impl From<actix_web::Error> for UploadError {
    fn from(err: actix_web::Error) -> Self {
        match err.as_error::<UploadError>() {
            Some(UploadError::PayloadTooLarge) => UploadError::PayloadTooLarge,
            Some(UploadError::Storage(e)) => UploadError::Storage(io::Error::new(e.kind(), e.to_string())),
            _ => {
                tracing::debug!(error = %err, "Upload form rejected");
                UploadError::NoFilePart
            }
        }
    }
}

/// Failures of the submit/poll cycle against the video generation service.
#[derive(Debug, Display)]
pub enum GenerationError {
    #[display("Video generation failed")]
    TaskFailed {
        task_id: String,
        reason: Option<String>,
    },

    #[display("Video generation timed out after {}", humantime::format_duration(*elapsed))]
    Timeout {
        task_id: String,
        elapsed: Duration,
    },

    #[display("Video generation service rejected the request ({status})")]
    Api {
        status: u16,
        message: String,
    },

    #[display("Failed to reach video generation service: {_0}")]
    Transport(String),

    #[display("Unexpected response from video generation service: {_0}")]
    Decode(String),

    #[display("Video generation client misconfigured: {_0}")]
    Client(String),
}

impl ResponseError for GenerationError {
    fn error_response(&self) -> HttpResponse {
        error_body(self.status_code(), self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            GenerationError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            GenerationError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GenerationError::Decode(err.to_string())
        } else if err.is_builder() {
            GenerationError::Client(err.to_string())
        } else {
            GenerationError::Transport(err.to_string())
        }
    }
}

/// Top-level error returned by HTTP handlers.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display("{_0}")]
    Upload(UploadError),

    #[display("{_0}")]
    Generation(GenerationError),

    #[display("Not found: {_0}")]
    NotFound(String),

    #[display("Internal server error")]
    InternalError(String),
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Upload(err) => err.error_response(),
            ApiError::Generation(err) => err.error_response(),
            ApiError::InternalError(detail) => {
                tracing::error!(error = %detail, "Request failed with internal error");
                error_body(self.status_code(), self.to_string())
            }
            ApiError::NotFound(_) => error_body(self.status_code(), self.to_string()),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Upload(err) => err.status_code(),
            ApiError::Generation(err) => err.status_code(),
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        ApiError::Upload(err)
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        ApiError::Generation(err)
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl From<actix_web::error::UrlGenerationError> for ApiError {
    fn from(err: actix_web::error::UrlGenerationError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

fn error_body(status: StatusCode, message: String) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header(ContentType::json())
        .json(GenerateResponse::Error { message })
}
