pub mod generation;
pub mod upload;
