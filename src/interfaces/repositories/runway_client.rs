use std::fmt;

use reqwest::{header, Client, RequestBuilder, Response};
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::{errors::GenerationError, settings::AppConfig};

/// HTTP client for Runway's developer API.
#[derive(Clone)]
pub struct RunwayClient {
    http: Client,
    base_url: Url,
    api_secret: Zeroizing<String>,
    api_version: String,
}

#[derive(Debug, Deserialize)]
struct RunwayErrorBody {
    error: Option<String>,
}

impl RunwayClient {
    pub fn new(config: &AppConfig) -> Result<Self, GenerationError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GenerationError::Client(e.to_string()))?;

        let base_url = Url::parse(&config.runway_base_url)
            .map_err(|e| GenerationError::Client(format!("invalid base URL: {e}")))?;

        Ok(RunwayClient {
            http,
            base_url,
            api_secret: Zeroizing::new(config.runway_api_secret.clone()),
            api_version: config.runway_api_version.clone(),
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, GenerationError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{}", path.trim_start_matches('/')))
            .map_err(|e| GenerationError::Client(e.to_string()))
    }

    pub(crate) fn get(&self, url: Url) -> RequestBuilder {
        self.authorized(self.http.get(url))
    }

    pub(crate) fn post(&self, url: Url) -> RequestBuilder {
        self.authorized(self.http.post(url))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(self.api_secret.as_str())
            .header("X-Runway-Version", &self.api_version)
            .header(header::ACCEPT, "application/json")
    }

    /// Turns a non-2xx response into an [`GenerationError::Api`], logging
    /// the upstream message.
    pub(crate) async fn check_status(response: Response) -> Result<Response, GenerationError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let raw = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<RunwayErrorBody>(&raw)
            .ok()
            .and_then(|body| body.error)
            .unwrap_or(raw);

        tracing::error!(
            status = status.as_u16(),
            message = %message,
            "Video generation service returned an error"
        );

        Err(GenerationError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl fmt::Debug for RunwayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunwayClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_secret", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish()
    }
}
