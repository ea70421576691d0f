use tokio::time::{sleep, Duration, Instant};

use crate::{
    entities::generation::{AspectRatio, ImageToVideoRequest, Task, TaskInfo, TaskStatus},
    errors::GenerationError,
    repositories::video_generation::VideoGenerationApi,
    settings::AppConfig,
};

/// Fixed parameters of every generation request.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub model: String,
    pub duration_secs: u32,
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
}

impl From<&AppConfig> for GenerationOptions {
    fn from(config: &AppConfig) -> Self {
        GenerationOptions {
            model: config.generation_model.clone(),
            duration_secs: config.video_duration_secs,
            poll_interval: config.poll_interval(),
            poll_timeout: config.poll_timeout(),
        }
    }
}

pub struct GenerationHandler<A>
where
    A: VideoGenerationApi,
{
    pub api: A,
    pub options: GenerationOptions,
}

impl<A> GenerationHandler<A>
where
    A: VideoGenerationApi,
{
    pub fn new(api: A, options: GenerationOptions) -> Self {
        GenerationHandler { api, options }
    }

    /// Submits an image-to-video task and waits for it to finish.
    ///
    /// Returns the task info when the task succeeds. Failed or cancelled
    /// tasks, service errors and a missed deadline are all errors, and are
    /// logged here before being handed back.
    pub async fn generate(
        &self,
        image_url: &str,
        aspect_ratio: AspectRatio,
        prompt_text: &str,
    ) -> Result<TaskInfo, GenerationError> {
        let request = ImageToVideoRequest {
            model: self.options.model.clone(),
            prompt_image: image_url.to_string(),
            prompt_text: Some(prompt_text.trim())
                .filter(|text| !text.is_empty())
                .map(str::to_string),
            ratio: aspect_ratio,
            duration: self.options.duration_secs,
        };

        self.run(&request).await.map_err(|e| {
            match &e {
                GenerationError::TaskFailed { task_id, reason } => tracing::warn!(
                    task_id = %task_id,
                    reason = reason.as_deref().unwrap_or("unknown"),
                    "Video generation task did not succeed"
                ),
                GenerationError::Timeout { task_id, .. } => tracing::error!(
                    task_id = %task_id,
                    error = %e,
                    "Gave up waiting for video generation task"
                ),
                _ => tracing::error!(error = %e, "Error occurred during video generation"),
            }
            e
        })
    }

    async fn run(&self, request: &ImageToVideoRequest) -> Result<TaskInfo, GenerationError> {
        let handle = self.api.create_image_to_video(request).await?;
        let task = self.wait_for_task(&handle.id).await?;

        match task.status {
            TaskStatus::Succeeded => {
                let info = TaskInfo::from(task);
                tracing::info!(task_id = %info.id, output = ?info.output, "Video generation succeeded");
                Ok(info)
            }
            _ => Err(GenerationError::TaskFailed {
                task_id: task.id,
                reason: task.failure.or(task.failure_code),
            }),
        }
    }

    /// Polls until the task reaches a terminal status or the next poll
    /// would start after the deadline. Always polls at least once.
    async fn wait_for_task(&self, task_id: &str) -> Result<Task, GenerationError> {
        let started = Instant::now();
        let deadline = started + self.options.poll_timeout;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let task = self.api.retrieve_task(task_id).await?;

            tracing::info!(
                task_id = %task_id,
                attempt,
                status = %task.status,
                progress = ?task.progress,
                "Polled video generation task"
            );

            if task.status.is_terminal() {
                return Ok(task);
            }

            if Instant::now() + self.options.poll_interval > deadline {
                return Err(GenerationError::Timeout {
                    task_id: task_id.to_string(),
                    elapsed: started.elapsed(),
                });
            }

            sleep(self.options.poll_interval).await;
        }
    }
}
