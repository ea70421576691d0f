mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::utils;

use errors::GenerationError;
use repositories::runway_client::RunwayClient;
use use_cases::{
    generation::{GenerationHandler, GenerationOptions},
    upload::UploadHandler,
};

pub struct AppState {
    pub config: settings::AppConfig,
    pub upload_handler: UploadHandler,
    pub generation_handler: AppGenerationHandler,
}

pub type AppGenerationHandler = GenerationHandler<RunwayClient>;

impl AppState {
    pub fn new(config: &settings::AppConfig) -> Result<Self, GenerationError> {
        let runway_client = RunwayClient::new(config)?;
        let generation_handler = GenerationHandler::new(runway_client, GenerationOptions::from(config));
        let upload_handler = UploadHandler::new(config.upload_dir.clone());

        Ok(AppState {
            config: config.clone(),
            upload_handler,
            generation_handler,
        })
    }
}
