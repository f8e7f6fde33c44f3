//! Give Up Crossword Use Case
//!
//! Voluntary forfeit of the crossword. Fails the whole session and
//! stamps the clock at the moment of the request. Idempotent when the
//! crossword is already terminal; refused when the session carries a
//! completion stamp with the crossword still open.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use platform::clock::Clock;
use uuid::Uuid;

use crate::domain::repository::SessionRepository;
use crate::error::{GameError, GameResult};

#[derive(Debug, Clone)]
pub struct GiveUpOutput {
    pub failed: bool,
    pub session_failed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_time_ms: Option<i64>,
}

/// Give Up Crossword Use Case
pub struct GiveUpCrosswordUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> GiveUpCrosswordUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { session_repo, clock }
    }

    pub async fn execute(&self, player_id: Uuid) -> GameResult<GiveUpOutput> {
        let now = self.clock.now();
        let output = self
            .session_repo
            .update_session_locked(player_id, |session| {
                if session.started_at.is_none() {
                    return Err(GameError::NotStarted);
                }
                if !session.crossword.is_terminal() {
                    // The stamp is written exactly once; a forfeit on
                    // a session that already carries one is refused
                    // rather than flipping state under it.
                    if session.completed_at.is_some() {
                        return Err(GameError::AlreadyFinished);
                    }
                    session.give_up_crossword(now);
                }

                Ok(GiveUpOutput {
                    failed: session.crossword.failed,
                    session_failed: session.failed,
                    completed_at: session.completed_at,
                    total_time_ms: session.total_time_ms,
                })
            })
            .await?;

        tracing::info!(player_id = %player_id, "Crossword forfeited");

        Ok(output)
    }
}
