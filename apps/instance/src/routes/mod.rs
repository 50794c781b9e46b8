use actix_web::web::ServiceConfig;

mod health;

pub fn routes(cfg: &mut ServiceConfig) {
    health::routes(cfg);
}
