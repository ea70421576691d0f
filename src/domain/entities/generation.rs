use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ───── Aspect Ratio ──────────────────────────────────────────────────

/// Output framing requested from the generation service.
///
/// Only two labels exist: anything wider than tall is landscape, everything
/// else (square included) is portrait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if height > 0 && f64::from(width) / f64::from(height) > 1.0 {
            AspectRatio::Landscape
        } else {
            AspectRatio::Portrait
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ───── External API Models ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Throttled,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Whether polling should stop on this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Cancelled)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Throttled => "THROTTLED",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Succeeded => "SUCCEEDED",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Cancelled => "CANCELLED",
            TaskStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Body of an image-to-video submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageToVideoRequest {
    pub model: String,
    pub prompt_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_text: Option<String>,
    pub ratio: AspectRatio,
    pub duration: u32,
}

/// Returned by the service when a task is accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskHandle {
    pub id: String,
}

/// Snapshot of a generation task as reported by the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub output: Option<Vec<String>>,
    #[serde(default)]
    pub failure: Option<String>,
    #[serde(default)]
    pub failure_code: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub status: TaskStatus,
    pub id: String,
    pub created_at: String,
    pub output: Option<Vec<String>>,
}

impl From<Task> for TaskInfo {
    fn from(task: Task) -> Self {
        Self {
            status: task.status,
            id: task.id,
            created_at: task.created_at.to_rfc3339(),
            output: task.output,
        }
    }
}

/// JSON envelope returned by `/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GenerateResponse {
    Success { task_info: TaskInfo },
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wide_images_are_landscape() {
        assert_eq!(AspectRatio::from_dimensions(1920, 1080), AspectRatio::Landscape);
        assert_eq!(AspectRatio::from_dimensions(101, 100), AspectRatio::Landscape);
    }

    #[test]
    fn square_and_tall_images_are_portrait() {
        assert_eq!(AspectRatio::from_dimensions(1080, 1080), AspectRatio::Portrait);
        assert_eq!(AspectRatio::from_dimensions(1080, 1920), AspectRatio::Portrait);
        assert_eq!(AspectRatio::from_dimensions(0, 0), AspectRatio::Portrait);
    }

    #[test]
    fn request_uses_wire_names_and_omits_missing_prompt() {
        let request = ImageToVideoRequest {
            model: "gen3a_turbo".into(),
            prompt_image: "https://host/uploads/a.png".into(),
            prompt_text: None,
            ratio: AspectRatio::Landscape,
            duration: 5,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "gen3a_turbo",
                "promptImage": "https://host/uploads/a.png",
                "ratio": "16:9",
                "duration": 5
            })
        );
    }

    #[test]
    fn unknown_statuses_keep_polling() {
        let task: Task = serde_json::from_value(json!({
            "id": "t-1",
            "status": "QUEUED_SOMEWHERE",
            "createdAt": "2024-09-01T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(task.status, TaskStatus::Unknown);
        assert!(!task.status.is_terminal());
        assert!(TaskStatus::Cancelled.is_terminal());
        assert!(!TaskStatus::Throttled.is_terminal());
    }

    #[test]
    fn success_envelope_shape() {
        let task: Task = serde_json::from_value(json!({
            "id": "t-1",
            "status": "SUCCEEDED",
            "createdAt": "2024-09-01T12:00:00Z",
            "output": ["https://example.com/video.mp4"]
        }))
        .unwrap();

        let response = GenerateResponse::Success { task_info: task.into() };

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "status": "success",
                "task_info": {
                    "status": "SUCCEEDED",
                    "id": "t-1",
                    "created_at": "2024-09-01T12:00:00+00:00",
                    "output": ["https://example.com/video.mp4"]
                }
            })
        );
    }

    #[test]
    fn error_envelope_shape() {
        let response = GenerateResponse::Error { message: "No file part".into() };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"status": "error", "message": "No file part"})
        );
    }
}
