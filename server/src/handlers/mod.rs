use crate::connection::ws_index;
use crate::handlers::sketches::configure_sketch_handlers;
use actix_files::Files;
use actix_web::web;
use std::path::Path;

mod sketches;

pub fn root(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws/").route(web::get().to(ws_index)));

    configure_sketch_handlers(cfg);
}

/// Mounted at `/`, so it must be registered after every other route.
pub fn configure_public_files(cfg: &mut web::ServiceConfig, dir: &Path) {
    cfg.service(Files::new("/", dir).index_file("index.html"));
}
