//! Weekly Puzzle Competition Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Session state machine, puzzle value objects, repository traits
//! - `application/` - Use cases
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers
//!
//! ## Trust Model
//! - The backend is the sole authority for the timer, the answer keys,
//!   and every state transition; clients never see answers nor submit
//!   elapsed time
//! - Per-player writes serialize on a session row lock; the cycle
//!   reset serializes on an advisory lock
//! - The operator surface authenticates with a shared key compared in
//!   constant time

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::GameConfig;
pub use error::{GameError, GameResult};
pub use infra::postgres::PgGameRepository;
pub use presentation::router::{admin_router, game_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult, OptionExt, ResultExt},
    kind::ErrorKind,
};

#[cfg(test)]
mod tests;
