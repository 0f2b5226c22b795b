use actix_web::web;

use crate::handlers::{content, experiences, skills};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/content")
            .route(web::get().to(content::list_content))
            .route(web::post().to(content::create_content)),
    )
    // Paths older frontends read skills and experience from; registered ahead of `{param}`
    .service(web::resource("/content/skills").route(web::get().to(skills::list_skills)))
    .service(web::resource("/content/experience").route(web::get().to(experiences::list_experiences)))
    // GET takes a content type, writes take a numeric id
    .service(
        web::resource("/content/{param}")
            .route(web::get().to(content::list_content_by_type))
            .route(web::put().to(content::update_content))
            .route(web::delete().to(content::delete_content)),
    )
    .service(
        web::resource("/about")
            .route(web::get().to(content::get_about))
            .route(web::put().to(content::update_about)),
    )
    .service(
        web::resource("/contact")
            .route(web::get().to(content::get_contact))
            .route(web::put().to(content::update_contact)),
    );
}
