//! Submit Grouping Guess Use Case
//!
//! Evaluates a four-word guess inside the session row lock so that two
//! concurrent guesses from the same player each see the other's
//! mistake count.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use platform::clock::Clock;
use uuid::Uuid;

use crate::application::config::GameConfig;
use crate::domain::entities::{GameSession, PuzzleKind};
use crate::domain::puzzle::{ConnectionsGroup, MAX_CONNECTIONS_MISTAKES, CONNECTIONS_GROUP_SIZE};
use crate::domain::repository::{ActivePuzzleRepository, RateLimitRepository, SessionRepository};
use crate::domain::services::{evaluate_grouping_guess, GroupingOutcome};
use crate::error::{GameError, GameResult};

#[derive(Debug, Clone)]
pub struct GuessOutput {
    pub correct: bool,
    pub already_solved: bool,
    pub near_miss: bool,
    pub solved_group: Option<ConnectionsGroup>,
    pub solved_groups: Vec<ConnectionsGroup>,
    pub mistakes: u32,
    pub mistakes_remaining: u32,
    pub completed: bool,
    pub failed: bool,
    pub session_failed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_time_ms: Option<i64>,
}

/// Submit Grouping Guess Use Case
pub struct SubmitGuessUseCase<S, Z, R>
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

impl<S, Z, R> SubmitGuessUseCase<S, Z, R>
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

    pub async fn execute(&self, player_id: Uuid, words: Vec<String>) -> GameResult<GuessOutput> {
        if words.len() != CONNECTIONS_GROUP_SIZE {
            return Err(GameError::InvalidInput(format!(
                "a guess must contain exactly {CONNECTIONS_GROUP_SIZE} words"
            )));
        }
        for word in &words {
            if word.trim().is_empty() || word.len() > self.config.max_word_len {
                return Err(GameError::InvalidInput("invalid word in guess".into()));
            }
        }

        let allowed = self
            .rate_repo
            .check_rate(
                &format!("guess:{player_id}"),
                self.config.guess_rate_max,
                self.config.guess_rate_window_ms(),
            )
            .await?;
        if !allowed {
            return Err(GameError::RateLimited);
        }

        let active = self.puzzle_repo.get_active_puzzle().await?;
        let puzzle = active.connections.ok_or(GameError::PuzzleUnavailable)?;

        let now = self.clock.now();
        let output = self
            .session_repo
            .update_session_locked(player_id, |session| {
                if session.started_at.is_none() {
                    return Err(GameError::NotStarted);
                }
                // A terminal sub-state freezes: a retried guess gets
                // the stored state back unchanged, never an error, so
                // a client that lost the response can resend safely.
                if session.connections.is_terminal() || session.is_finished() {
                    return Ok(frozen_output(session));
                }

                let outcome =
                    evaluate_grouping_guess(&words, &session.connections.solved_groups, &puzzle);

                let (correct, already_solved, near_miss, solved_group) = match outcome {
                    GroupingOutcome::Match(group) => {
                        session.record_group_solved(group.clone(), puzzle.groups.len(), now);
                        (true, false, false, Some(group))
                    }
                    // Not a fresh match, not a mistake either.
                    GroupingOutcome::AlreadySolved(group) => (false, true, false, Some(group)),
                    GroupingOutcome::NearMiss => {
                        session.record_group_miss(now);
                        (false, false, true, None)
                    }
                    GroupingOutcome::NoMatch => {
                        session.record_group_miss(now);
                        (false, false, false, None)
                    }
                };

                Ok(GuessOutput {
                    correct,
                    already_solved,
                    near_miss,
                    solved_group,
                    solved_groups: session.connections.solved_groups.clone(),
                    mistakes: session.connections.mistakes,
                    mistakes_remaining: MAX_CONNECTIONS_MISTAKES
                        .saturating_sub(session.connections.mistakes),
                    completed: session.connections.completed,
                    failed: session.connections.failed,
                    session_failed: session.failed,
                    completed_at: session.completed_at,
                    total_time_ms: session.total_time_ms,
                })
            })
            .await?;

        tracing::debug!(
            player_id = %player_id,
            kind = PuzzleKind::Connections.as_str(),
            correct = output.correct,
            mistakes = output.mistakes,
            "Grouping guess evaluated"
        );

        Ok(output)
    }
}

fn frozen_output(session: &GameSession) -> GuessOutput {
    GuessOutput {
        correct: false,
        already_solved: false,
        near_miss: false,
        solved_group: None,
        solved_groups: session.connections.solved_groups.clone(),
        mistakes: session.connections.mistakes,
        mistakes_remaining: MAX_CONNECTIONS_MISTAKES
            .saturating_sub(session.connections.mistakes),
        completed: session.connections.completed,
        failed: session.connections.failed,
        session_failed: session.failed,
        completed_at: session.completed_at,
        total_time_ms: session.total_time_ms,
    }
}
