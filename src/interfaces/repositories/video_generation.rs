use async_trait::async_trait;

use crate::{
    entities::generation::{ImageToVideoRequest, Task, TaskHandle},
    errors::GenerationError,
    repositories::runway_client::RunwayClient,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoGenerationApi: Send + Sync {
    /// Submits an image-to-video task and returns its handle
    async fn create_image_to_video(&self, request: &ImageToVideoRequest) -> Result<TaskHandle, GenerationError>;

    /// Fetches the current state of a task
    async fn retrieve_task(&self, task_id: &str) -> Result<Task, GenerationError>;
}

#[async_trait]
impl VideoGenerationApi for RunwayClient {
    async fn create_image_to_video(&self, request: &ImageToVideoRequest) -> Result<TaskHandle, GenerationError> {
        let url = self.endpoint("v1/image_to_video")?;

        let response = self.post(url).json(request).send().await?;

        let handle = Self::check_status(response).await?.json::<TaskHandle>().await?;

        tracing::info!(task_id = %handle.id, model = %request.model, "Submitted image-to-video task");
        Ok(handle)
    }

    async fn retrieve_task(&self, task_id: &str) -> Result<Task, GenerationError> {
        let url = self.endpoint(&format!("v1/tasks/{task_id}"))?;

        let response = self.get(url).send().await?;

        Ok(Self::check_status(response).await?.json::<Task>().await?)
    }
}
