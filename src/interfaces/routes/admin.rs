use actix_web::web;

use crate::handlers::admin;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin/projects")
            .service(web::resource("").route(web::get().to(admin::admin_projects)))
            .service(web::resource("/stats").route(web::get().to(admin::project_stats)))
            .service(web::resource("/{id}/activate").route(web::put().to(admin::activate_project)))
            .service(web::resource("/{id}/deactivate").route(web::put().to(admin::deactivate_project))),
    );
}
