use actix_web::{web, App, HttpServer};
use backend::config::Settings;
use backend::services;
use backend::state::AppState;
use env_logger::Env;
use log::info;
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let settings =
        Settings::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let host = settings.host.clone();
    let port = settings.port;
    let storage_path = settings.storage_path.clone();

    let state = AppState::from_settings(settings).map_err(io::Error::other)?;

    info!("Serving documents from {}", storage_path.display());
    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(web::PayloadConfig::default().limit(10 * 1024 * 1024))
            .app_data(web::Data::new(state.clone()))
            .service(services::documents::configure_routes())
            .service(actix_files::Files::new("/files", &storage_path))
    })
        .bind((host.as_str(), port))?
        .run()
        .await
}
