use actix_web::web;

use crate::handlers::generate;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/generate")
            .route(web::post().to(generate::generate_video))
    );
}
