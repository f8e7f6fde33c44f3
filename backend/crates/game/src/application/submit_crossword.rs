//! Submit Crossword Use Case
//!
//! Grades a full 5x5 grid under the session row lock. Correct cells
//! cement across attempts; a submission that leaves no wrong fillable
//! cell completes the puzzle, and the final failed attempt reveals
//! nothing beyond the wrong-cell list.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use platform::clock::Clock;
use uuid::Uuid;

use crate::application::config::GameConfig;
use crate::domain::entities::GameSession;
use crate::domain::puzzle::{Cell, Grid, MAX_CROSSWORD_ATTEMPTS};
use crate::domain::repository::{ActivePuzzleRepository, RateLimitRepository, SessionRepository};
use crate::domain::services::evaluate_crossword_grid;
use crate::error::{GameError, GameResult};

#[derive(Debug, Clone)]
pub struct CrosswordOutput {
    pub correct: bool,
    pub wrong_cells: Vec<Cell>,
    pub cemented_cells: Vec<Cell>,
    pub attempts: u32,
    pub attempts_remaining: u32,
    pub completed: bool,
    pub failed: bool,
    pub session_failed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_time_ms: Option<i64>,
}

/// Submit Crossword Use Case
pub struct SubmitCrosswordUseCase<S, Z, R>
where
    S: SessionRepository,
    Z: ActivePuzzleRepository,
    R: RateLimitRepository,
{
    session_repo: Arc<S>,
    puzzle_repo: Arc<Z>,
    rate_repo: Arc<R>,
    config: Arc<GameConfig>,
    clock: Arc<dyn Clock>,
}

impl<S, Z, R> SubmitCrosswordUseCase<S, Z, R>
where
    S: SessionRepository,
    Z: ActivePuzzleRepository,
    R: RateLimitRepository,
{
    pub fn new(
        session_repo: Arc<S>,
        puzzle_repo: Arc<Z>,
        rate_repo: Arc<R>,
        config: Arc<GameConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            session_repo,
            puzzle_repo,
            rate_repo,
            config,
            clock,
        }
    }

    pub async fn execute(&self, player_id: Uuid, grid: Grid) -> GameResult<CrosswordOutput> {
        let allowed = self
            .rate_repo
            .check_rate(
                &format!("submit:{player_id}"),
                self.config.guess_rate_max,
                self.config.guess_rate_window_ms(),
            )
            .await?;
        if !allowed {
            return Err(GameError::RateLimited);
        }

        let active = self.puzzle_repo.get_active_puzzle().await?;
        let puzzle = active.crossword.ok_or(GameError::PuzzleUnavailable)?;

        if grid.len() != puzzle.size || grid.iter().any(|row| row.len() != puzzle.size) {
            return Err(GameError::InvalidInput(format!(
                "grid must be {size}x{size}",
                size = puzzle.size
            )));
        }
        for row in &grid {
            for cell in row.iter().flatten() {
                if cell.chars().count() > 1 {
                    return Err(GameError::InvalidInput(
                        "grid cells hold a single character".into(),
                    ));
                }
            }
        }

        let now = self.clock.now();
        let output = self
            .session_repo
            .update_session_locked(player_id, |session| {
                if session.started_at.is_none() {
                    return Err(GameError::NotStarted);
                }
                // A terminal sub-state freezes: a retried submission
                // gets the frozen cemented/attempt state back without
                // spending an attempt.
                if session.crossword.is_terminal() || session.is_finished() {
                    return Ok(frozen_output(session));
                }

                let check = evaluate_crossword_grid(&grid, &puzzle.grid);
                let wrong_cells = session.record_crossword_attempt(&check, grid.clone(), now);

                Ok(CrosswordOutput {
                    correct: session.crossword.completed,
                    wrong_cells,
                    cemented_cells: session.crossword.cemented_cells.clone(),
                    attempts: session.crossword.attempts,
                    attempts_remaining: MAX_CROSSWORD_ATTEMPTS
                        .saturating_sub(session.crossword.attempts),
                    completed: session.crossword.completed,
                    failed: session.crossword.failed,
                    session_failed: session.failed,
                    completed_at: session.completed_at,
                    total_time_ms: session.total_time_ms,
                })
            })
            .await?;

        tracing::debug!(
            player_id = %player_id,
            correct = output.correct,
            attempts = output.attempts,
            "Crossword submission graded"
        );

        Ok(output)
    }
}

fn frozen_output(session: &GameSession) -> CrosswordOutput {
    CrosswordOutput {
        correct: session.crossword.completed,
        wrong_cells: Vec::new(),
        cemented_cells: session.crossword.cemented_cells.clone(),
        attempts: session.crossword.attempts,
        attempts_remaining: MAX_CROSSWORD_ATTEMPTS
            .saturating_sub(session.crossword.attempts),
        completed: session.crossword.completed,
        failed: session.crossword.failed,
        session_failed: session.failed,
        completed_at: session.completed_at,
        total_time_ms: session.total_time_ms,
    }
}
