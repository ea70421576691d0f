pub mod public_url;
pub mod secure_filename;
