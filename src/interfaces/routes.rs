use actix_web::web;

use crate::{
    handlers::{home::home, system},
    middlewares::metrics_auth::MetricsAuth,
};

mod admin;
mod analytics;
mod chat;
mod content;
mod experiences;
mod json_error;
mod projects;
mod skills;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);

    cfg.service(web::resource("/health").route(web::get().to(system::health_check)));
    cfg.service(
        web::resource("/metrics")
            .wrap(MetricsAuth)
            .route(web::get().to(system::metrics)),
    );

    // `/api` serves the same handlers for clients built before versioning
    cfg.service(web::scope("/api/v1").configure(api_routes));
    cfg.service(web::scope("/api").configure(api_routes));

    cfg.configure(json_error::config_routes);
}

fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(projects::config_routes)
        .configure(skills::config_routes)
        .configure(experiences::config_routes)
        .configure(content::config_routes)
        .configure(chat::config_routes)
        .configure(analytics::config_routes)
        .configure(admin::config_routes);
}
