use actix_web::{App, HttpServer, middleware, web};

use lessondeck::config::AppConfig;
use lessondeck::handlers;
use lessondeck::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env();

    // Media directory holds built decks served under /media
    std::fs::create_dir_all(&config.media_dir)?;

    let state = AppState::from_config(&config);
    match state.catalog.ensure_default_template() {
        Ok(true) => log::info!("Wrote default template to {}", state.catalog.dir().display()),
        Ok(false) => {}
        Err(e) => log::warn!("Could not create default template: {e}"),
    }

    let state = web::Data::new(state);
    let media_dir = config.media_dir.clone();

    log::info!("Starting server at http://{}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(handlers::configure)
            .service(handlers::media_files(&media_dir))
            // Must be registered last
            .default_service(web::to(handlers::not_found))
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
