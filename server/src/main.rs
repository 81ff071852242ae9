use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};

use whiteboard_server::config::ServerConfig;
use whiteboard_server::connection::Gateway;
use whiteboard_server::handlers;
use whiteboard_server::server::spawn_server;
use whiteboard_server::sketch_file::SketchStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env()?;
    log::info!("Starting with {:?}", config);

    let store = SketchStore::new(&config.sketches_dir);
    store
        .ensure_dir()
        .await
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))?;

    let srv_tx = spawn_server(config.membership);
    let gateway = web::Data::new(Gateway::new(srv_tx, config.outbound_buffer));
    let max_sketch_bytes = config.max_sketch_bytes;
    let public_dir = config.public_dir.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(gateway.clone())
            .data(store.clone())
            .app_data(web::JsonConfig::default().limit(max_sketch_bytes))
            .configure(|cfg| {
                handlers::root(cfg);
                if let Some(dir) = &public_dir {
                    handlers::configure_public_files(cfg, dir);
                }
            })
    })
    .bind(config.bind_address())?
    .run()
    .await
}
