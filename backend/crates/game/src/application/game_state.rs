//! Game State Use Case
//!
//! Session snapshot for refresh/reconnect. Read-only; always allowed
//! for a valid token, locked or not, so a player can see their own
//! finished board.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::GameSession;
use crate::domain::repository::SessionRepository;
use crate::error::GameResult;

pub struct GetGameStateUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
}

impl<S> GetGameStateUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    pub async fn execute(&self, player_id: Uuid) -> GameResult<Option<GameSession>> {
        self.session_repo.find_session(player_id).await
    }
}
