//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use std::sync::Arc;
use std::time::Duration;

use auth::store::CodeStore;
use auth::{InMemoryAuthRepository, LogSmsSender, PgAuthRepository, auth_router_generic};
use axum::{
    Json, Router,
    http::{Method, header},
    routing::get,
};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

const URL_V1: &str = "/api/v1";
const URL_PING: &str = "/ping";
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct PingResponse {
    message: &'static str,
}

async fn ping() -> Json<PingResponse> {
    Json(PingResponse { message: "pong" })
}

/// Drop expired codes and windows now and then every `every`
///
/// Failures are logged and retried on the next tick.
fn spawn_purge<R>(store: Arc<R>, every: Duration)
where
    R: CodeStore + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match store.purge_expired().await {
                Ok(dropped) => tracing::debug!(dropped, "Auth code purge completed"),
                Err(e) => tracing::warn!(error = %e, "Auth code purge failed, continuing anyway"),
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    let auth_routes = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(config.auth.store_timeout)
                .connect(database_url)
                .await?;

            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            let store = PgAuthRepository::new(pool);
            spawn_purge(Arc::new(store.clone()), PURGE_INTERVAL);
            auth_router_generic(store, LogSmsSender::new(), config.auth.clone())
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory stores (development only)");
            let store = InMemoryAuthRepository::new();
            spawn_purge(Arc::new(store.clone()), PURGE_INTERVAL);
            auth_router_generic(store, LogSmsSender::revealing_codes(), config.auth.clone())
        }
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(config.frontend_origins.clone())
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    // Build router
    let app = Router::new()
        .nest(
            URL_V1,
            Router::new().route(URL_PING, get(ping)).merge(auth_routes),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        );

    // Start server
    let addr = config.bind_addr;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
