//! Puzzle Value Objects
//!
//! Immutable answer-key and archive types. The core never mutates
//! these; the active puzzle is read-only input supplied by the
//! [`ActivePuzzleRepository`](crate::domain::repository::ActivePuzzleRepository).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mistakes allowed on the grouping puzzle before it fails.
pub const MAX_CONNECTIONS_MISTAKES: u32 = 4;
/// Words per group in the grouping puzzle.
pub const CONNECTIONS_GROUP_SIZE: usize = 4;
/// Groups per grouping puzzle.
pub const CONNECTIONS_NUM_GROUPS: usize = 4;
/// Full-grid submissions allowed on the crossword before it fails.
pub const MAX_CROSSWORD_ATTEMPTS: u32 = 3;
/// Crossword grid edge length.
pub const CROSSWORD_SIZE: usize = 5;

/// One group of four related words, ordered by difficulty in the
/// answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionsGroup {
    pub label: String,
    pub words: Vec<String>,
    /// 1 (easiest) to 4 (hardest)
    pub difficulty: u8,
    pub color: String,
}

/// Grouping puzzle answer key: four groups of four words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionsPuzzle {
    pub groups: Vec<ConnectionsGroup>,
}

impl ConnectionsPuzzle {
    /// All sixteen words in answer-key order.
    pub fn all_words(&self) -> Vec<String> {
        self.groups
            .iter()
            .flat_map(|g| g.words.iter().cloned())
            .collect()
    }
}

/// A crossword cell coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A letter grid; `None` marks a block cell.
pub type Grid = Vec<Vec<Option<String>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClueDirection {
    Across,
    Down,
}

/// A single clue. Answers live only in the grid, so clues are safe to
/// send to players as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosswordClue {
    pub number: u32,
    pub clue: String,
    pub row: usize,
    pub col: usize,
    pub direction: ClueDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosswordClues {
    pub across: Vec<CrosswordClue>,
    pub down: Vec<CrosswordClue>,
}

/// Crossword answer key: the solved grid plus clue lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosswordPuzzle {
    pub size: usize,
    pub grid: Grid,
    pub clues: CrosswordClues,
}

impl CrosswordPuzzle {
    /// A blank grid with the same block layout, for sending to players.
    pub fn empty_grid(&self) -> Grid {
        self.grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.as_ref().map(|_| String::new()))
                    .collect()
            })
            .collect()
    }
}

/// The current-cycle puzzle singleton. Either half may be unset while
/// an operator is still configuring the cycle.
#[derive(Debug, Clone)]
pub struct ActivePuzzle {
    pub connections: Option<ConnectionsPuzzle>,
    pub crossword: Option<CrosswordPuzzle>,
    pub updated_at: DateTime<Utc>,
}

impl ActivePuzzle {
    pub fn is_configured(&self) -> bool {
        self.connections.is_some() && self.crossword.is_some()
    }
}

/// One ranked row of a cycle's final leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub name: String,
    pub region: String,
    pub handle: String,
    pub total_time_ms: i64,
}

/// Immutable snapshot of one finished game cycle. Append-only; written
/// solely by the archive/reset transaction.
#[derive(Debug, Clone, Serialize)]
pub struct GameArchive {
    pub id: Uuid,
    pub archived_on: NaiveDate,
    pub connections: ConnectionsPuzzle,
    pub crossword: CrosswordPuzzle,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub created_at: DateTime<Utc>,
}

/// Listing row for archive browsing.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveSummary {
    pub id: Uuid,
    pub archived_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub player_count: i64,
}
