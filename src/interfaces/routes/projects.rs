use actix_web::web;

use crate::handlers::projects;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/projects")
            .route(web::get().to(projects::list_projects))
            .route(web::post().to(projects::create_project)),
    )
    .service(
        web::resource("/projects/{id}")
            .route(web::get().to(projects::get_project))
            .route(web::put().to(projects::update_project))
            .route(web::delete().to(projects::delete_project)),
    );
}
