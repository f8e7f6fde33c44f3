//! Reorder Words Use Case
//!
//! Persists the player's shuffled word arrangement so a refresh shows
//! the board exactly as they left it. The stored order must be a
//! permutation of the currently unsolved words.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::repository::{ActivePuzzleRepository, SessionRepository};
use crate::error::{GameError, GameResult};

/// Reorder Words Use Case
pub struct ReorderWordsUseCase<S, Z>
where
    S: SessionRepository,
    Z: ActivePuzzleRepository,
{
    session_repo: Arc<S>,
    puzzle_repo: Arc<Z>,
}

impl<S, Z> ReorderWordsUseCase<S, Z>
where
    S: SessionRepository,
    Z: ActivePuzzleRepository,
{
    pub fn new(session_repo: Arc<S>, puzzle_repo: Arc<Z>) -> Self {
        Self {
            session_repo,
            puzzle_repo,
        }
    }

    pub async fn execute(&self, player_id: Uuid, word_order: Vec<String>) -> GameResult<()> {
        let active = self.puzzle_repo.get_active_puzzle().await?;
        let puzzle = active.connections.ok_or(GameError::PuzzleUnavailable)?;

        self.session_repo
            .update_session_locked(player_id, |session| {
                if session.connections.is_terminal() || session.failed {
                    return Err(GameError::AlreadyFinished);
                }

                let solved: HashSet<String> = session
                    .connections
                    .solved_groups
                    .iter()
                    .flat_map(|g| g.words.iter())
                    .map(|w| w.to_uppercase())
                    .collect();
                let unsolved: HashSet<String> = puzzle
                    .all_words()
                    .into_iter()
                    .map(|w| w.to_uppercase())
                    .filter(|w| !solved.contains(w))
                    .collect();
                let submitted: HashSet<String> =
                    word_order.iter().map(|w| w.to_uppercase()).collect();

                if word_order.len() != unsolved.len() || submitted != unsolved {
                    return Err(GameError::InvalidInput(
                        "word order must contain each unsolved word exactly once".into(),
                    ));
                }

                session.connections.word_order = word_order;
                Ok(())
            })
            .await
    }
}
