//! Admin Use Cases
//!
//! Puzzle authoring and the competition lock. Both halves of the
//! weekly pair are uploaded independently; play only opens once both
//! pass shape validation and are stored.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::puzzle::{
    ActivePuzzle, ConnectionsPuzzle, CrosswordPuzzle, CONNECTIONS_GROUP_SIZE,
    CONNECTIONS_NUM_GROUPS, CROSSWORD_SIZE,
};
use crate::domain::repository::{ActivePuzzleRepository, SettingsRepository};
use crate::error::{GameError, GameResult};

#[derive(Debug, Clone)]
pub struct PuzzleStatus {
    pub connections_set: bool,
    pub crossword_set: bool,
    pub ready: bool,
    pub updated_at: DateTime<Utc>,
}

/// Set Active Puzzle Use Case
pub struct SetPuzzleUseCase<Z>
where
    Z: ActivePuzzleRepository,
{
    puzzle_repo: Arc<Z>,
}

impl<Z> SetPuzzleUseCase<Z>
where
    Z: ActivePuzzleRepository,
{
    pub fn new(puzzle_repo: Arc<Z>) -> Self {
        Self { puzzle_repo }
    }

    pub async fn set_connections(&self, puzzle: ConnectionsPuzzle) -> GameResult<()> {
        validate_connections(&puzzle)?;
        self.puzzle_repo.set_active_connections(&puzzle).await?;
        tracing::info!("Grouping puzzle replaced");
        Ok(())
    }

    pub async fn set_crossword(&self, puzzle: CrosswordPuzzle) -> GameResult<()> {
        validate_crossword(&puzzle)?;
        self.puzzle_repo.set_active_crossword(&puzzle).await?;
        tracing::info!("Crossword puzzle replaced");
        Ok(())
    }

    pub async fn status(&self) -> GameResult<(ActivePuzzle, PuzzleStatus)> {
        let active = self.puzzle_repo.get_active_puzzle().await?;
        let status = PuzzleStatus {
            connections_set: active.connections.is_some(),
            crossword_set: active.crossword.is_some(),
            ready: active.is_configured(),
            updated_at: active.updated_at,
        };
        Ok((active, status))
    }
}

/// Lock Game Use Case
pub struct LockGameUseCase<T>
where
    T: SettingsRepository,
{
    settings_repo: Arc<T>,
}

impl<T> LockGameUseCase<T>
where
    T: SettingsRepository,
{
    pub fn new(settings_repo: Arc<T>) -> Self {
        Self { settings_repo }
    }

    pub async fn set_locked(&self, locked: bool) -> GameResult<bool> {
        self.settings_repo.set_game_locked(locked).await?;
        tracing::info!(locked, "Competition lock updated");
        Ok(locked)
    }

    pub async fn locked(&self) -> GameResult<bool> {
        self.settings_repo.game_locked().await
    }
}

fn validate_connections(puzzle: &ConnectionsPuzzle) -> GameResult<()> {
    if puzzle.groups.len() != CONNECTIONS_NUM_GROUPS {
        return Err(GameError::InvalidInput(format!(
            "expected {CONNECTIONS_NUM_GROUPS} groups"
        )));
    }

    let mut seen = HashSet::new();
    for group in &puzzle.groups {
        if group.label.trim().is_empty() {
            return Err(GameError::InvalidInput("group label is empty".into()));
        }
        if !(1..=4).contains(&group.difficulty) {
            return Err(GameError::InvalidInput(
                "group difficulty must be between 1 and 4".into(),
            ));
        }
        if group.words.len() != CONNECTIONS_GROUP_SIZE {
            return Err(GameError::InvalidInput(format!(
                "each group needs exactly {CONNECTIONS_GROUP_SIZE} words"
            )));
        }
        for word in &group.words {
            if word.trim().is_empty() {
                return Err(GameError::InvalidInput("group word is empty".into()));
            }
            if !seen.insert(word.trim().to_uppercase()) {
                return Err(GameError::InvalidInput(format!(
                    "duplicate word across groups: {word}"
                )));
            }
        }
    }
    Ok(())
}

fn validate_crossword(puzzle: &CrosswordPuzzle) -> GameResult<()> {
    if puzzle.size != CROSSWORD_SIZE {
        return Err(GameError::InvalidInput(format!(
            "crossword size must be {CROSSWORD_SIZE}"
        )));
    }
    if puzzle.grid.len() != CROSSWORD_SIZE
        || puzzle.grid.iter().any(|row| row.len() != CROSSWORD_SIZE)
    {
        return Err(GameError::InvalidInput(format!(
            "grid must be {CROSSWORD_SIZE}x{CROSSWORD_SIZE}"
        )));
    }

    let mut fillable = 0usize;
    for row in &puzzle.grid {
        for cell in row.iter().flatten() {
            if cell.chars().count() != 1 || !cell.chars().all(|c| c.is_alphabetic()) {
                return Err(GameError::InvalidInput(
                    "answer cells hold a single letter".into(),
                ));
            }
            fillable += 1;
        }
    }
    if fillable == 0 {
        return Err(GameError::InvalidInput("answer grid is all blocks".into()));
    }

    if puzzle.clues.across.is_empty() && puzzle.clues.down.is_empty() {
        return Err(GameError::InvalidInput("puzzle has no clues".into()));
    }
    for clue in puzzle.clues.across.iter().chain(puzzle.clues.down.iter()) {
        if clue.clue.trim().is_empty() {
            return Err(GameError::InvalidInput(format!(
                "clue {} has no text",
                clue.number
            )));
        }
        if clue.row >= CROSSWORD_SIZE || clue.col >= CROSSWORD_SIZE {
            return Err(GameError::InvalidInput(format!(
                "clue {} starts outside the grid",
                clue.number
            )));
        }
        if puzzle.grid[clue.row][clue.col].is_none() {
            return Err(GameError::InvalidInput(format!(
                "clue {} starts on a block",
                clue.number
            )));
        }
    }
    Ok(())
}
