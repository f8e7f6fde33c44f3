//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, http,
    http::{HeaderName, Method, header},
};
use game::{GameConfig, PgGameRepository, admin_router, game_router};
use platform::clock::{Clock, SystemClock};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

const SESSION_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-session-token");
const ADMIN_KEY_HEADER: HeaderName = HeaderName::from_static("x-admin-key");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,game=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: drop stale rate-limit windows
    // Errors here should not prevent server startup
    let repo_for_cleanup = PgGameRepository::new(pool.clone());
    match repo_for_cleanup.cleanup_stale_rate_limits().await {
        Ok(deleted) => {
            tracing::info!(rate_limits_deleted = deleted, "Rate limit cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Rate limit cleanup failed, continuing anyway");
        }
    }

    // Game configuration
    let config = match env::var("ADMIN_KEY") {
        Ok(key) if !key.trim().is_empty() => GameConfig::with_admin_key(key),
        _ if cfg!(debug_assertions) => {
            let config = GameConfig::with_random_admin_key();
            tracing::warn!(
                admin_key = %config.admin_key,
                "ADMIN_KEY not set, generated a random one for this run"
            );
            config
        }
        _ => panic!("ADMIN_KEY must be set in production"),
    };
    let config = Arc::new(config);

    let repo = PgGameRepository::new(pool.clone());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::ACCEPT,
            SESSION_TOKEN_HEADER,
            ADMIN_KEY_HEADER,
        ]));

    // Build router
    let app = Router::new()
        .nest(
            "/api/game",
            game_router(repo.clone(), config.clone(), clock.clone()),
        )
        .nest("/api/admin", admin_router(repo, config, clock))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 31113));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
