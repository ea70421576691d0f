use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::constants::ALLOWED_EXTENSIONS;

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^A-Za-z0-9_.-]").expect("static filename pattern is valid")
});

/// Reduces a client supplied filename to a flat, ASCII-only name that is
/// safe to join onto the upload directory.
///
/// May return an empty string when nothing usable remains.
pub fn secure_filename(name: &str) -> String {
    let flattened: String = name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    UNSAFE_CHARS
        .replace_all(&joined, "")
        .trim_matches(|c: char| c == '.' || c == '_')
        .to_string()
}

/// Lowercased text after the last `.`, if any.
pub fn file_extension(name: &str) -> Option<String> {
    name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

pub fn allowed_file(name: &str) -> bool {
    file_extension(name).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Storage name for an upload: a fresh uuid followed by the sanitized name.
///
/// Names that lose their stem or extension to sanitizing become `upload.<ext>`.
pub fn unique_filename(original: &str) -> String {
    let mut safe = secure_filename(original);
    let ext = file_extension(original).map(|ext| secure_filename(&ext));

    if let Some(ext) = ext.filter(|ext| !ext.is_empty()) {
        if safe.is_empty() || safe == ext || file_extension(&safe).as_deref() != Some(ext.as_str()) {
            safe = format!("upload.{ext}");
        }
    } else if safe.is_empty() {
        safe = "upload".to_string();
    }

    format!("{}_{}", Uuid::new_v4(), safe)
}
