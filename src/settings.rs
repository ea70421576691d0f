use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, path::PathBuf, str::FromStr, time::Duration};
use url::Url;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    /// Directory holding transient uploads. Created at startup if absent.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Externally reachable origin used to build image URLs for the
    /// generation service. Falls back to the inbound request's host.
    #[serde(default)]
    pub public_base_url: Option<String>,

    #[serde(default)]
    pub runway_api_secret: String,

    #[serde(default = "default_runway_base_url")]
    pub runway_base_url: String,

    #[serde(default = "default_runway_api_version")]
    pub runway_api_version: String,

    #[serde(default = "default_generation_model")]
    pub generation_model: String,

    #[serde(default = "default_video_duration")]
    pub video_duration_secs: u32,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_stale_upload_ttl")]
    pub stale_upload_ttl_secs: u64,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Img2Vid-API".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_upload_dir() -> PathBuf {
    PathBuf::from("/tmp/uploads")
}
fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}
fn default_runway_base_url() -> String {
    "https://api.dev.runwayml.com".to_string()
}
fn default_runway_api_version() -> String {
    "2024-11-06".to_string()
}
fn default_generation_model() -> String {
    "gen3a_turbo".to_string()
}
fn default_video_duration() -> u32 {
    5
}
fn default_poll_interval() -> u64 {
    10_000
}
fn default_poll_timeout() -> u64 {
    15 * 60
}
fn default_request_timeout() -> u64 {
    60
}
fn default_stale_upload_ttl() -> u64 {
    60 * 60
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .ignore_empty(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // The SDK-style variable name is accepted when the prefixed one is absent
        config.runway_api_secret = fill_or_env(config.runway_api_secret, "RUNWAYML_API_SECRET")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.runway_api_secret.trim().is_empty() {
            errors.push("RUNWAYML_API_SECRET cannot be empty".to_string());
        }
        if self.upload_dir.as_os_str().is_empty() {
            errors.push("UPLOAD_DIR cannot be empty".to_string());
        }
        if self.max_upload_bytes == 0 {
            errors.push("MAX_UPLOAD_BYTES must be greater than zero".to_string());
        }
        if let Err(e) = Url::parse(&self.runway_base_url) {
            errors.push(format!("RUNWAY_BASE_URL is not a valid URL: {e}"));
        }
        if let Some(base) = &self.public_base_url {
            if let Err(e) = Url::parse(base) {
                errors.push(format!("PUBLIC_BASE_URL is not a valid URL: {e}"));
            }
        }
        if self.poll_interval_ms == 0 {
            errors.push("POLL_INTERVAL_MS must be greater than zero".to_string());
        }
        if self.poll_timeout().is_zero() || self.poll_timeout() < self.poll_interval() {
            errors.push("POLL_TIMEOUT_SECS must be at least one poll interval".to_string());
        }
        if self.stale_upload_ttl() <= self.poll_timeout() {
            errors.push("STALE_UPLOAD_TTL_SECS must be greater than POLL_TIMEOUT_SECS".to_string());
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn stale_upload_ttl(&self) -> Duration {
        Duration::from_secs(self.stale_upload_ttl_secs)
    }
}

fn fill_or_env(current: String, env_key: &str) -> Result<String, ConfigError> {
    if current.trim().is_empty() {
        env::var(env_key).map_err(|_| ConfigError::Message(format!("{env_key} must be set")))
    } else {
        Ok(current)
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for str {
    fn redact(&self) -> &str {
        if self.is_empty() {
            "[MISSING]"
        } else {
            "[REDACTED]"
        }
    }
}

impl Redact for String {
    fn redact(&self) -> &str {
        self.as_str().redact()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("upload_dir", &self.upload_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("public_base_url", &self.public_base_url)
            .field("runway_api_secret", &self.runway_api_secret.redact())
            .field("runway_base_url", &self.runway_base_url)
            .field("runway_api_version", &self.runway_api_version)
            .field("generation_model", &self.generation_model)
            .field("video_duration_secs", &self.video_duration_secs)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("stale_upload_ttl_secs", &self.stale_upload_ttl_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            env: AppEnvironment::Testing,
            name: "Img2Vid Test".to_string(),
            port: 0,
            host: "127.0.0.1".to_string(),
            worker_count: 1,
            cors_allowed_origins: vec!["*".to_string()],
            upload_dir: PathBuf::from("/tmp/uploads"),
            max_upload_bytes: default_max_upload_bytes(),
            public_base_url: None,
            runway_api_secret: "key_test_secret".to_string(),
            runway_base_url: default_runway_base_url(),
            runway_api_version: default_runway_api_version(),
            generation_model: default_generation_model(),
            video_duration_secs: 5,
            poll_interval_ms: 10_000,
            poll_timeout_secs: 900,
            request_timeout_secs: 60,
            stale_upload_ttl_secs: 3600,
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn collects_every_problem() {
        let mut cfg = config();
        cfg.runway_api_secret = "  ".to_string();
        cfg.public_base_url = Some("not a url".to_string());
        cfg.poll_interval_ms = 0;

        let message = cfg.validate().unwrap_err().to_string();
        assert!(message.contains("RUNWAYML_API_SECRET"));
        assert!(message.contains("PUBLIC_BASE_URL"));
        assert!(message.contains("POLL_INTERVAL_MS"));
    }

    #[test]
    fn poll_timeout_must_cover_an_interval() {
        let mut cfg = config();
        cfg.poll_interval_ms = 20_000;
        cfg.poll_timeout_secs = 10;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn stale_uploads_outlive_the_poll_deadline() {
        let mut cfg = config();
        cfg.stale_upload_ttl_secs = cfg.poll_timeout_secs;

        let message = cfg.validate().unwrap_err().to_string();
        assert!(message.contains("STALE_UPLOAD_TTL_SECS"));

        cfg.stale_upload_ttl_secs = cfg.poll_timeout_secs + 1;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn wildcard_cors_rejected_in_production() {
        let mut cfg = config();
        cfg.env = AppEnvironment::Production;
        assert!(cfg.validate().is_err());

        cfg.cors_allowed_origins = vec!["https://app.example.com, https://admin.example.com".to_string()];
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.cors_origins().len(), 2);
    }

    #[test]
    fn debug_output_redacts_secret() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("key_test_secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
