pub mod generate;
pub mod home;
pub mod system;
pub mod uploads;
