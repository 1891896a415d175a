use actix_web::{web, App, HttpServer, middleware::Logger};
use anyhow::Context;
use dotenv::dotenv;
use std::net::TcpListener;

use prompt_relay::clients::UpstreamClient;
use prompt_relay::config;
use prompt_relay::handlers;
use prompt_relay::middleware::build_cors;
use prompt_relay::routes::configure_routes;
use prompt_relay::services::EnhancementService;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load application settings
    let app_settings = match config::init_config() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load application settings: {}", e);
            log::error!("Cannot start server without valid settings");
            std::process::exit(1);
        }
    };

    let upstream_client = match UpstreamClient::new(&app_settings.upstream) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to initialize upstream client: {}", e);
            std::process::exit(1);
        }
    };
    let enhancement_service = web::Data::new(EnhancementService::new(upstream_client));

    let host = &app_settings.server.host;
    let port = app_settings.server.port;
    let server_addr = format!("{}:{}", host, port);

    log::info!("Prompt relay running at http://{}", server_addr);
    log::info!("Health check: http://{}/health", server_addr);
    log::info!("Enhancement endpoint: http://{}/enhance", server_addr);
    log::info!("Environment: {}", app_settings.app.environment);
    log::info!("Upstream model: {}", app_settings.upstream.model_id);
    if app_settings.upstream.has_credential() {
        log::info!("Upstream API: configured");
    } else {
        log::warn!("Upstream API: not configured, /enhance will fail with ConfigurationError");
    }

    let listener = TcpListener::bind(&server_addr)
        .with_context(|| format!("failed to bind {}", server_addr))?;

    let settings_data = web::Data::new(app_settings);

    HttpServer::new(move || {
        let cors = build_cors(&settings_data.server.cors_origins);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(settings_data.clone())
            .app_data(enhancement_service.clone())
            .configure(configure_routes)
            .default_service(web::to(handlers::not_found::endpoint_not_found))
    })
    .listen(listener)?
    .run()
    .await
    .context("HTTP server terminated with an error")?;

    log::info!("Server stopped, shutdown complete");
    Ok(())
}
