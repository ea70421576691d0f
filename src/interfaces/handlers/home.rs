use actix_web::{get, HttpResponse, Responder};

#[get("/")]
pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Image-to-video generation API",
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "generate": "POST /generate (multipart: file, promptText)",
            "uploads": "GET /uploads/{filename}",
            "health": "GET /health"
        }
    }))
}
