//! Admin Middleware

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::application::config::GameConfig;
use crate::domain::repository::GameRepository;
use crate::error::GameError;
use crate::presentation::handlers::GameAppState;

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Middleware that guards the operator surface with the shared admin
/// key. Comparison is constant-time.
pub async fn require_admin_key<R>(
    axum::extract::State(state): axum::extract::State<GameAppState<R>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    R: GameRepository,
{
    if !admin_key_matches(&state.config, req.headers().get(ADMIN_KEY_HEADER)) {
        tracing::warn!("Admin request with missing or wrong key");
        return Err(GameError::AdminKeyInvalid.into_response());
    }

    Ok(next.run(req).await)
}

fn admin_key_matches(config: &GameConfig, header: Option<&axum::http::HeaderValue>) -> bool {
    if config.admin_key.is_empty() {
        return false;
    }
    let Some(presented) = header.and_then(|v| v.to_str().ok()) else {
        return false;
    };
    platform::crypto::constant_time_eq(presented.as_bytes(), config.admin_key.as_bytes())
}
