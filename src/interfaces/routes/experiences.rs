use actix_web::web;

use crate::handlers::experiences;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/experiences")
            .route(web::get().to(experiences::list_experiences))
            .route(web::post().to(experiences::create_experience)),
    )
    .service(
        web::resource("/experiences/{id}")
            .route(web::get().to(experiences::get_experience))
            .route(web::put().to(experiences::update_experience))
            .route(web::delete().to(experiences::delete_experience)),
    );
}
