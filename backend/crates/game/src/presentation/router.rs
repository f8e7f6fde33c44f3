//! Game Routers

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use platform::clock::Clock;

use crate::application::config::GameConfig;
use crate::domain::repository::GameRepository;
use crate::infra::postgres::PgGameRepository;
use crate::presentation::handlers::{self, GameAppState};
use crate::presentation::middleware::require_admin_key;

/// Create the player-facing router with the PostgreSQL repository
pub fn game_router(repo: PgGameRepository, config: Arc<GameConfig>, clock: Arc<dyn Clock>) -> Router {
    game_router_generic(repo, config, clock)
}

/// Create the operator router with the PostgreSQL repository
pub fn admin_router(repo: PgGameRepository, config: Arc<GameConfig>, clock: Arc<dyn Clock>) -> Router {
    admin_router_generic(repo, config, clock)
}

/// Player-facing router for any repository implementation
pub fn game_router_generic<R>(repo: R, config: Arc<GameConfig>, clock: Arc<dyn Clock>) -> Router
where
    R: GameRepository,
{
    let state = GameAppState {
        repo: Arc::new(repo),
        config,
        clock,
    };

    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/state", get(handlers::game_state::<R>))
        .route("/start-puzzle", post(handlers::start_puzzle::<R>))
        .route("/connections/guess", post(handlers::submit_guess::<R>))
        .route("/connections/reorder", post(handlers::reorder_words::<R>))
        .route("/crossword/submit", post(handlers::submit_crossword::<R>))
        .route("/crossword/give-up", post(handlers::give_up_crossword::<R>))
        .route("/leaderboard", get(handlers::leaderboard::<R>))
        .with_state(state)
}

/// Operator router for any repository implementation; every route sits
/// behind the admin-key middleware.
pub fn admin_router_generic<R>(repo: R, config: Arc<GameConfig>, clock: Arc<dyn Clock>) -> Router
where
    R: GameRepository,
{
    let state = GameAppState {
        repo: Arc::new(repo),
        config,
        clock,
    };

    Router::new()
        .route("/puzzle", get(handlers::puzzle_status::<R>))
        .route(
            "/puzzle/connections",
            put(handlers::set_connections_puzzle::<R>),
        )
        .route("/puzzle/crossword", put(handlers::set_crossword_puzzle::<R>))
        .route(
            "/lock",
            get(handlers::get_lock::<R>).post(handlers::set_lock::<R>),
        )
        .route("/archive", post(handlers::archive_and_reset::<R>))
        .route("/archives", get(handlers::list_archives::<R>))
        .route("/archives/{id}", get(handlers::get_archive::<R>))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_admin_key::<R>,
        ))
        .with_state(state)
}
