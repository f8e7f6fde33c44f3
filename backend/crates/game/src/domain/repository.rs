//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the
//! infrastructure layer; tests provide in-memory fakes.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::entities::{GameSession, Player};
use crate::domain::puzzle::{
    ActivePuzzle, ArchiveSummary, ConnectionsPuzzle, CrosswordPuzzle, GameArchive,
};
use crate::error::GameResult;

/// Player repository trait
#[trait_variant::make(PlayerRepository: Send)]
pub trait LocalPlayerRepository {
    /// Persist a newly registered player
    async fn create_player(&self, player: &Player) -> GameResult<()>;

    /// Look up a player by session credential
    async fn find_player_by_token(&self, token: &str) -> GameResult<Option<Player>>;

    /// Look up a player by handle (duplicate-registration check)
    async fn find_player_by_handle(&self, handle: &str) -> GameResult<Option<Player>>;
}

/// Session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Fetch the player's session, creating a blank one on first use
    async fn get_or_create_session(&self, player_id: Uuid) -> GameResult<GameSession>;

    /// Fetch the player's session without creating one
    async fn find_session(&self, player_id: Uuid) -> GameResult<Option<GameSession>>;

    /// Exclusive read-modify-write on one player's session row.
    ///
    /// The implementation must take an exclusive row lock, read the
    /// row fresh *after* acquiring it, run `apply`, persist the
    /// mutated session and commit before releasing. An `Err` from
    /// `apply` rolls the whole operation back.
    async fn update_session_locked<T, F>(&self, player_id: Uuid, apply: F) -> GameResult<T>
    where
        T: Send,
        F: FnOnce(&mut GameSession) -> GameResult<T> + Send;
}

/// Active (current-cycle) puzzle repository trait
#[trait_variant::make(ActivePuzzleRepository: Send)]
pub trait LocalActivePuzzleRepository {
    async fn get_active_puzzle(&self) -> GameResult<ActivePuzzle>;

    async fn set_active_connections(&self, puzzle: &ConnectionsPuzzle) -> GameResult<()>;

    async fn set_active_crossword(&self, puzzle: &CrosswordPuzzle) -> GameResult<()>;
}

/// Archive repository trait
#[trait_variant::make(ArchiveRepository: Send)]
pub trait LocalArchiveRepository {
    /// The cycle reset: snapshot the active puzzle and leaderboard
    /// into a new archive record, then wipe all player/session state
    /// and clear the active puzzle. One atomic unit, serialized
    /// against other invocations of itself.
    async fn archive_and_reset(&self, archived_on: NaiveDate) -> GameResult<GameArchive>;

    async fn list_archives(&self) -> GameResult<Vec<ArchiveSummary>>;

    async fn find_archive(&self, id: Uuid) -> GameResult<Option<GameArchive>>;

    /// Most recent archive, if any cycle has been archived yet
    async fn latest_archive(&self) -> GameResult<Option<GameArchive>>;
}

/// Operator settings repository trait
#[trait_variant::make(SettingsRepository: Send)]
pub trait LocalSettingsRepository {
    async fn game_locked(&self) -> GameResult<bool>;

    async fn set_game_locked(&self, locked: bool) -> GameResult<()>;
}

/// Rate limit repository trait
#[trait_variant::make(RateLimitRepository: Send)]
pub trait LocalRateLimitRepository {
    /// Fixed-window counter check; returns true if the request is
    /// allowed.
    async fn check_rate(&self, key: &str, max_requests: u32, window_ms: i64) -> GameResult<bool>;
}

/// Everything the HTTP layer needs from one storage backend.
pub trait GameRepository:
    PlayerRepository
    + SessionRepository
    + ActivePuzzleRepository
    + ArchiveRepository
    + SettingsRepository
    + RateLimitRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> GameRepository for T where
    T: PlayerRepository
        + SessionRepository
        + ActivePuzzleRepository
        + ArchiveRepository
        + SettingsRepository
        + RateLimitRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}
