use actix_web::web;

use crate::handlers::{home::home, system::health_check};

mod generate;
mod uploads;
pub mod multipart_error;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);
    cfg.service(health_check);

    cfg.configure(generate::config_routes)
        .configure(uploads::config_routes);
}
