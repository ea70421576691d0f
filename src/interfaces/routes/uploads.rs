use actix_web::web;

use crate::{constants::UPLOADED_FILE_ROUTE, handlers::uploads};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/uploads/{filename}")
            .name(UPLOADED_FILE_ROUTE)
            .route(web::get().to(uploads::uploaded_file))
    );
}
