use actix_web::web;

use crate::handlers::chat;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/chat").route(web::post().to(chat::chat)))
        .service(web::resource("/chat/health").route(web::get().to(chat::chat_health)));
}
