//! Game Error Types
//!
//! Domain-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.
//!
//! Guesses and submissions against a terminal sub-state are not
//! errors: they return the frozen state unchanged. `AlreadyFinished`
//! covers the calls that are refused outright, like a give-up or a
//! reorder once the session carries its completion stamp.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Game-specific result type alias
pub type GameResult<T> = Result<T, GameError>;

/// Game-specific error variants
#[derive(Debug, Error)]
pub enum GameError {
    /// No session token supplied
    #[error("Session token required")]
    MissingToken,

    /// Token does not match any player (or the cycle was reset)
    #[error("Invalid session token")]
    InvalidToken,

    /// Admin key missing or wrong
    #[error("Invalid admin key")]
    AdminKeyInvalid,

    /// Game is locked by the operator
    #[error("The game is closed right now")]
    GameLocked,

    /// Handle already registered this cycle
    #[error("This handle is already registered")]
    HandleTaken,

    /// Active puzzle missing or only half configured
    #[error("No puzzle available")]
    PuzzleUnavailable,

    /// Archive precondition: cannot snapshot an incomplete puzzle
    #[error("Cannot archive: the active puzzle is not fully configured")]
    PuzzleIncomplete,

    /// Player has no session row
    #[error("Session not found")]
    SessionNotFound,

    /// Requested archive does not exist
    #[error("Archive not found")]
    ArchiveNotFound,

    /// Submission before any start-puzzle call (client sequencing bug)
    #[error("Game not started")]
    NotStarted,

    /// Operation rejected because the session already carries its
    /// completion stamp
    #[error("Game already finished")]
    AlreadyFinished,

    /// Malformed guess, grid, or puzzle payload
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Rate limit exceeded
    #[error("Too many requests, slow down")]
    RateLimited,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Sub-state (de)serialization error
    #[error("State serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GameError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GameError::MissingToken | GameError::InvalidToken | GameError::AdminKeyInvalid => {
                StatusCode::UNAUTHORIZED
            }
            GameError::GameLocked => StatusCode::FORBIDDEN,
            GameError::HandleTaken
            | GameError::PuzzleIncomplete
            | GameError::AlreadyFinished => StatusCode::CONFLICT,
            GameError::PuzzleUnavailable
            | GameError::SessionNotFound
            | GameError::ArchiveNotFound => StatusCode::NOT_FOUND,
            GameError::NotStarted | GameError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GameError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            GameError::Database(_) | GameError::Serialization(_) | GameError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::MissingToken | GameError::InvalidToken | GameError::AdminKeyInvalid => {
                ErrorKind::Unauthorized
            }
            GameError::GameLocked => ErrorKind::Forbidden,
            GameError::HandleTaken
            | GameError::PuzzleIncomplete
            | GameError::AlreadyFinished => ErrorKind::Conflict,
            GameError::PuzzleUnavailable
            | GameError::SessionNotFound
            | GameError::ArchiveNotFound => ErrorKind::NotFound,
            GameError::NotStarted | GameError::InvalidInput(_) => ErrorKind::BadRequest,
            GameError::RateLimited => ErrorKind::TooManyRequests,
            GameError::Database(_) | GameError::Serialization(_) | GameError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            GameError::Database(e) => {
                tracing::error!(error = %e, "Game database error");
            }
            GameError::Serialization(e) => {
                tracing::error!(error = %e, "Session state serialization error");
            }
            GameError::Internal(msg) => {
                tracing::error!(message = %msg, "Game internal error");
            }
            GameError::RateLimited => {
                tracing::warn!("Game rate limit exceeded");
            }
            GameError::AdminKeyInvalid => {
                tracing::warn!("Admin key rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Game error");
            }
        }
    }
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        AppError::new(kind, message)
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();
        let body = axum::Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
