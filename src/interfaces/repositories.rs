pub mod runway_client;
pub mod video_generation;
