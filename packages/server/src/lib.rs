#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the potential student map.
//!
//! Serves the REST API a map frontend queries: potential-student regions
//! around an address as `GeoJSON`, the citywide neighborhood summary, and
//! the neighborhood lookup table. The tract table is loaded once by the
//! caller and shared read-only between workers.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use serde::{Deserialize, Serialize};
use student_map_dataset::MapConfig;
use student_map_dataset::query::QuerySettings;
use student_map_dataset::table::TractTable;
use student_map_geocoder::Geocoder;

/// Shared application state.
pub struct AppState {
    /// The merged tract table.
    pub table: Arc<TractTable>,
    /// Resolves query addresses.
    pub geocoder: Arc<dyn Geocoder>,
    /// Default center and geocoder deadline.
    pub settings: QuerySettings,
    /// Map defaults.
    pub map: MapConfig,
}

/// Where the server listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: String,
    /// Port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Applies the `BIND_ADDR` and `PORT` environment variables, when set.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(bind_addr) = std::env::var("BIND_ADDR") {
            self.bind_addr = bind_addr;
        }
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        self
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/regions", web::get().to(handlers::regions))
            .route("/city-summary", web::get().to(handlers::city_summary))
            .route("/neighborhoods", web::get().to(handlers::neighborhoods)),
    );
}

/// Starts the API server.
///
/// This is a regular async function; the caller is responsible for
/// providing the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(state: AppState, config: &ServerConfig) -> std::io::Result<()> {
    let state = web::Data::new(state);

    log::info!(
        "Starting server on {}:{} with {} tracts",
        config.bind_addr,
        config.port,
        state.table.len()
    );

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
