use actix_web::{web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod db;
mod model;
mod rules;
mod service;

use app::AppState;
use model::Config;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr();

    tracing::info!(
        database = %config.database_path.display(),
        inference_url = %config.inference.base_url,
        report_url = %config.report.base_url,
        "Starting lot-intel service"
    );

    let state = AppState::new(&config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize application state");
        std::io::Error::other(e.to_string())
    })?;

    let analyzer = web::Data::new(state.analyzer);
    let knowledge = web::Data::new(state.knowledge);
    let report_service = web::Data::new(state.report_service);

    tracing::info!(addr = %bind_addr, "Listening");

    HttpServer::new(move || {
        App::new()
            .app_data(analyzer.clone())
            .app_data(knowledge.clone())
            .app_data(report_service.clone())
            .configure(api::lots::configure)
            .configure(api::health::configure)
            .configure(api::openapi::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
