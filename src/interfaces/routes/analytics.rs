use actix_web::web;

use crate::handlers::analytics;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/analytics/track").route(web::post().to(analytics::track_visit)))
        .service(web::resource("/analytics/visit").route(web::post().to(analytics::track_visit)));
}
