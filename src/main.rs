use actix_web::{web, App, HttpServer};
use actix_cors::Cors;
use portal_auth::{AppState, Settings, AppError};
use portal_auth::auth::handlers::{login, me};
use dotenv::dotenv;
use std::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn cors(config: &Settings) -> Cors {
    if !config.cors.enabled {
        // CORS disabled - use most restrictive settings
        return Cors::default();
    }

    let cors_config = Cors::default();
    let cors_config = if config.cors.allow_any_origin {
        cors_config
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .expose_any_header()
    } else {
        cors_config
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://127.0.0.1:3000")
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec!["Authorization", "Content-Type"])
    };

    cors_config.max_age(config.cors.max_age as usize)
}

#[actix_web::main]
async fn main() -> portal_auth::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    // Load configuration
    let config = Settings::new()?;
    info!(environment = %config.environment, "Configuration loaded successfully");

    let state = AppState::new(config.clone()).await?;
    let state = web::Data::new(state);
    info!("Identity store connected");

    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))?;
    info!("Starting server at {}:{}", config.server.host, config.server.port);

    let workers = config.server.workers as usize;
    HttpServer::new(move || {
        App::new()
            .wrap(cors(&config))
            .app_data(state.clone())
            .route("/health", web::get().to(portal_auth::health_check))
            .route("/auth/login", web::post().to(login))
            .route("/auth/me", web::get().to(me))
    })
    .listen(listener)?
    .workers(workers)
    .run()
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(())
}
