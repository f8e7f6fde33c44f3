//! Domain Entities
//!
//! The per-player session state machine. All transitions are pure
//! `&mut self` methods taking `now` from the caller's clock; the
//! application layer runs them inside a row-locked read-modify-write
//! so concurrent requests from the same player serialize cleanly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::puzzle::{
    Cell, ConnectionsGroup, Grid, MAX_CONNECTIONS_MISTAKES, MAX_CROSSWORD_ATTEMPTS,
};
use crate::domain::services::GridCheck;

/// Registered competitor. Immutable after creation; destroyed only by
/// the cycle reset.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub region: String,
    pub handle: String,
    pub session_token: String,
    pub created_at: DateTime<Utc>,
}

impl Player {
    pub fn new(name: String, region: String, handle: String, session_token: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            region,
            handle,
            session_token,
            created_at: Utc::now(),
        }
    }
}

/// Which of the two puzzles an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PuzzleKind {
    Connections,
    Crossword,
}

impl PuzzleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PuzzleKind::Connections => "connections",
            PuzzleKind::Crossword => "crossword",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "connections" => Some(PuzzleKind::Connections),
            "crossword" => Some(PuzzleKind::Crossword),
            _ => None,
        }
    }
}

/// Grouping puzzle sub-state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionsState {
    #[serde(default)]
    pub solved_groups: Vec<ConnectionsGroup>,
    #[serde(default)]
    pub mistakes: u32,
    #[serde(default)]
    pub failed: bool,
    #[serde(default)]
    pub completed: bool,
    /// Per-player tile order, persisted so refreshes keep the layout.
    #[serde(default)]
    pub word_order: Vec<String>,
}

impl ConnectionsState {
    pub fn is_terminal(&self) -> bool {
        self.completed || self.failed
    }
}

/// Crossword sub-state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrosswordState {
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub failed: bool,
    #[serde(default)]
    pub attempts: u32,
    /// Cells confirmed correct on some prior submission. Grows only.
    #[serde(default)]
    pub cemented_cells: Vec<Cell>,
    #[serde(default)]
    pub current_grid: Grid,
}

impl CrosswordState {
    pub fn is_terminal(&self) -> bool {
        self.completed || self.failed
    }
}

/// The sole mutable entity of the core: one row per player, holding
/// the shared timer and both puzzle sub-states.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub id: Uuid,
    pub player_id: Uuid,
    /// Set exactly once, by whichever puzzle is opened first.
    pub started_at: Option<DateTime<Utc>>,
    pub first_puzzle: Option<PuzzleKind>,
    pub connections: ConnectionsState,
    pub crossword: CrosswordState,
    /// Completion stamp; written exactly once, by the first transition
    /// that makes the session finished.
    pub completed_at: Option<DateTime<Utc>>,
    pub total_time_ms: Option<i64>,
    /// True once either puzzle hit its failure threshold (or the
    /// player gave up). A failed session is finished immediately.
    pub failed: bool,
}

impl GameSession {
    pub fn new(player_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_id,
            started_at: None,
            first_puzzle: None,
            connections: ConnectionsState::default(),
            crossword: CrosswordState::default(),
            completed_at: None,
            total_time_ms: None,
            failed: false,
        }
    }

    /// Idempotent timer start. The first call sets `started_at` and
    /// records which puzzle was opened; every later call returns the
    /// existing value untouched.
    pub fn start(&mut self, kind: PuzzleKind, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.started_at {
            Some(started) => started,
            None => {
                self.started_at = Some(now);
                self.first_puzzle = Some(kind);
                now
            }
        }
    }

    /// Finished the instant both sub-states are terminal, or as soon
    /// as any failure threshold is hit (failure stops the clock
    /// without waiting for the other puzzle).
    pub fn is_finished(&self) -> bool {
        self.failed || (self.connections.is_terminal() && self.crossword.is_terminal())
    }

    /// A correct grouping guess: append the group, complete the
    /// sub-state when the last group falls.
    pub fn record_group_solved(
        &mut self,
        group: ConnectionsGroup,
        total_groups: usize,
        now: DateTime<Utc>,
    ) {
        self.connections.solved_groups.push(group);
        if self.connections.solved_groups.len() >= total_groups {
            self.connections.completed = true;
        }
        self.stamp_if_finished(now);
    }

    /// A wrong grouping guess (near-miss included): one more mistake,
    /// failing both the sub-state and the session at the limit.
    pub fn record_group_miss(&mut self, now: DateTime<Utc>) {
        self.connections.mistakes += 1;
        if self.connections.mistakes >= MAX_CONNECTIONS_MISTAKES {
            self.connections.failed = true;
            self.failed = true;
        }
        self.stamp_if_finished(now);
    }

    /// A full-grid crossword submission. Merges this submission's
    /// correct cells into the cemented set (union, never shrinks),
    /// then decides completion/failure. Returns the cells still wrong
    /// after cementing, sorted for stable output.
    pub fn record_crossword_attempt(
        &mut self,
        check: &GridCheck,
        submitted: Grid,
        now: DateTime<Utc>,
    ) -> Vec<Cell> {
        self.crossword.attempts += 1;
        self.crossword.current_grid = submitted;

        for cell in &check.correct_cells {
            if !self.crossword.cemented_cells.contains(cell) {
                self.crossword.cemented_cells.push(*cell);
            }
        }
        self.crossword.cemented_cells.sort();

        // A cemented cell can never regress to wrong.
        let mut still_wrong: Vec<Cell> = check
            .wrong_cells
            .iter()
            .copied()
            .filter(|c| !self.crossword.cemented_cells.contains(c))
            .collect();
        still_wrong.sort();

        if still_wrong.is_empty() {
            self.crossword.completed = true;
        } else if self.crossword.attempts >= MAX_CROSSWORD_ATTEMPTS {
            self.crossword.failed = true;
            self.failed = true;
        }
        self.stamp_if_finished(now);
        still_wrong
    }

    /// Forced crossword failure, bypassing the attempt counter.
    pub fn give_up_crossword(&mut self, now: DateTime<Utc>) {
        self.crossword.failed = true;
        self.failed = true;
        self.stamp_if_finished(now);
    }

    /// Write the completion stamp once the session is finished. The
    /// first transition to observe the finished state performs the
    /// write; every later one sees `completed_at` set and leaves it
    /// alone.
    fn stamp_if_finished(&mut self, now: DateTime<Utc>) {
        if self.completed_at.is_some() {
            return;
        }
        let Some(started) = self.started_at else {
            return;
        };
        if self.is_finished() {
            self.completed_at = Some(now);
            self.total_time_ms = Some((now - started).num_milliseconds());
        }
    }
}
