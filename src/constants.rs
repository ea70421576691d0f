use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Extensions accepted by `/generate`, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Route name used to build externally reachable image URLs.
pub const UPLOADED_FILE_ROUTE: &str = "uploaded_file";
