#[cfg(feature = "server")]
use std::time::Duration;

#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware, web};

#[cfg(feature = "server")]
use crate::models::config::AppConfig;
#[cfg(feature = "server")]
use crate::repository::PostgrestRepository;
#[cfg(feature = "server")]
use crate::services::cache::QueryCache;

pub mod domain;
pub mod dto;
pub mod models;
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
pub mod services;

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(config: AppConfig) -> std::io::Result<()> {
    let repo = PostgrestRepository::new(
        &config.supabase_url,
        &config.supabase_key,
        &config.table,
        config.request_timeout_secs.map(Duration::from_secs),
    )
    .map_err(|e| std::io::Error::other(format!("Failed to build backend client: {e}")))?;

    log::info!("Serving students from {}", repo.endpoint());

    let repo = web::Data::new(repo);
    // Shared by every worker so a write on one invalidates reads on all.
    let cache = web::Data::new(QueryCache::new());
    let bind_address = (config.address.clone(), config.port);
    let config = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .app_data(repo.clone())
            .app_data(cache.clone())
            .app_data(config.clone())
            .configure(routes::api::configure::<PostgrestRepository>)
    })
    .bind(bind_address)?
    .run()
    .await
}
