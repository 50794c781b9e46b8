use actix_web::{HttpResponse, Responder, web};

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(health_route)));
}

/// Liveness check. Only reflects that the process is serving requests.
pub async fn health_route() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body("ok")
}
