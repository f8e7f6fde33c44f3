//! Start Puzzle Use Case
//!
//! Idempotent timer start: the first start-puzzle call from either
//! puzzle page sets `started_at`; every later call (duplicate click,
//! refresh, the other puzzle) observes the existing value. Also builds
//! the answer-free puzzle view for the requested kind.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use platform::clock::Clock;
use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::domain::entities::{ConnectionsState, PuzzleKind};
use crate::domain::puzzle::{ConnectionsPuzzle, CrosswordClues, Grid};
use crate::domain::repository::{ActivePuzzleRepository, SessionRepository};
use crate::error::{GameError, GameResult};

/// Grouping-puzzle view: the unsolved words in the player's persisted
/// order, never the answer key.
#[derive(Debug, Clone)]
pub struct ConnectionsView {
    pub words: Vec<String>,
    pub num_groups: usize,
}

/// Crossword view: the player's current grid (or a blank one) plus the
/// clue lists. Answers live only in the answer grid and are never
/// included.
#[derive(Debug, Clone)]
pub struct CrosswordView {
    pub size: usize,
    pub grid: Grid,
    pub clues: CrosswordClues,
}

#[derive(Debug, Clone)]
pub struct StartPuzzleOutput {
    pub kind: PuzzleKind,
    pub started_at: DateTime<Utc>,
    pub server_time: DateTime<Utc>,
    pub connections: Option<ConnectionsView>,
    pub crossword: Option<CrosswordView>,
}

/// Start Puzzle Use Case
pub struct StartPuzzleUseCase<S, Z>
where
    S: SessionRepository,
    Z: ActivePuzzleRepository,
{
    session_repo: Arc<S>,
    puzzle_repo: Arc<Z>,
    clock: Arc<dyn Clock>,
}

impl<S, Z> StartPuzzleUseCase<S, Z>
where
    S: SessionRepository,
    Z: ActivePuzzleRepository,
{
    pub fn new(session_repo: Arc<S>, puzzle_repo: Arc<Z>, clock: Arc<dyn Clock>) -> Self {
        Self {
            session_repo,
            puzzle_repo,
            clock,
        }
    }

    pub async fn execute(&self, player_id: Uuid, kind: PuzzleKind) -> GameResult<StartPuzzleOutput> {
        let active = self.puzzle_repo.get_active_puzzle().await?;
        let (connections, crossword) = match (active.connections, active.crossword) {
            (Some(c), Some(x)) => (c, x),
            _ => return Err(GameError::PuzzleUnavailable),
        };

        // Make sure the row exists before taking the row lock.
        self.session_repo.get_or_create_session(player_id).await?;

        let now = self.clock.now();
        let output = self
            .session_repo
            .update_session_locked(player_id, |session| {
                // A finished puzzle still gets its view back (so the
                // client can render the final board), but must not
                // start the timer for a player who never played.
                let puzzle_done = match kind {
                    PuzzleKind::Connections => session.connections.is_terminal(),
                    PuzzleKind::Crossword => session.crossword.is_terminal(),
                };
                let started_at = if puzzle_done {
                    session.started_at.ok_or(GameError::NotStarted)?
                } else {
                    session.start(kind, now)
                };

                let (connections_view, crossword_view) = match kind {
                    PuzzleKind::Connections => {
                        let words = words_for_player(&mut session.connections, &connections);
                        (
                            Some(ConnectionsView {
                                words,
                                num_groups: connections.groups.len(),
                            }),
                            None,
                        )
                    }
                    PuzzleKind::Crossword => {
                        let grid = if session.crossword.current_grid.is_empty() {
                            crossword.empty_grid()
                        } else {
                            session.crossword.current_grid.clone()
                        };
                        (
                            None,
                            Some(CrosswordView {
                                size: crossword.size,
                                grid,
                                clues: crossword.clues.clone(),
                            }),
                        )
                    }
                };

                Ok(StartPuzzleOutput {
                    kind,
                    started_at,
                    server_time: now,
                    connections: connections_view,
                    crossword: crossword_view,
                })
            })
            .await?;

        tracing::info!(
            player_id = %player_id,
            kind = kind.as_str(),
            started_at = %output.started_at,
            "Puzzle started"
        );

        Ok(output)
    }
}

/// The unsolved words in the player's stored order, reshuffling (and
/// re-persisting) when the stored order is missing or no longer a
/// permutation of the unsolved set.
fn words_for_player(state: &mut ConnectionsState, puzzle: &ConnectionsPuzzle) -> Vec<String> {
    let solved: HashSet<String> = state
        .solved_groups
        .iter()
        .flat_map(|g| g.words.iter())
        .map(|w| w.to_uppercase())
        .collect();

    let unsolved: Vec<String> = puzzle
        .all_words()
        .into_iter()
        .filter(|w| !solved.contains(&w.to_uppercase()))
        .collect();

    let stored: Vec<String> = state
        .word_order
        .iter()
        .filter(|w| !solved.contains(&w.to_uppercase()))
        .cloned()
        .collect();

    let unsolved_set: HashSet<String> = unsolved.iter().map(|w| w.to_uppercase()).collect();
    let stored_set: HashSet<String> = stored.iter().map(|w| w.to_uppercase()).collect();

    if stored.len() == unsolved.len() && stored_set == unsolved_set {
        return stored;
    }

    let mut shuffled = unsolved;
    shuffled.shuffle(&mut rand::rng());
    state.word_order = shuffled.clone();
    shuffled
}
