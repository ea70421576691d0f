use actix_web::HttpRequest;
use url::Url;

use crate::{constants::UPLOADED_FILE_ROUTE, errors::ApiError};

/// Builds the URL under which the generation service can fetch an upload.
///
/// A configured public base wins; otherwise the URL is derived from the
/// inbound request's scheme and host.
pub fn image_url(
    req: &HttpRequest,
    public_base_url: Option<&str>,
    file_name: &str,
) -> Result<Url, ApiError> {
    match public_base_url {
        Some(base) => from_base(base, file_name),
        None => Ok(req.url_for(UPLOADED_FILE_ROUTE, [file_name])?),
    }
}

pub fn from_base(base: &str, file_name: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| ApiError::InternalError(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(["uploads", file_name]);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_onto_public_base() {
        let url = from_base("https://media.example.com", "abc_cat.png").unwrap();
        assert_eq!(url.as_str(), "https://media.example.com/uploads/abc_cat.png");

        let url = from_base("https://example.com/app/", "abc_cat.png").unwrap();
        assert_eq!(url.as_str(), "https://example.com/app/uploads/abc_cat.png");
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(from_base("mailto:someone@example.com", "a.png").is_err());
    }
}
