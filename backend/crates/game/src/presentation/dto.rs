//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::start_puzzle::StartPuzzleOutput;
use crate::application::submit_crossword::CrosswordOutput;
use crate::application::submit_guess::GuessOutput;
use crate::domain::entities::{GameSession, Player, PuzzleKind};
use crate::domain::puzzle::{
    ArchiveSummary, Cell, ConnectionsGroup, ConnectionsPuzzle, CrosswordClues, CrosswordPuzzle,
    GameArchive, Grid, LeaderboardEntry,
};

/// Request for POST /api/game/register
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub region: String,
    pub handle: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub player_id: Uuid,
    pub name: String,
    pub region: String,
    pub handle: String,
}

impl From<&Player> for PlayerResponse {
    fn from(p: &Player) -> Self {
        Self {
            player_id: p.id,
            name: p.name.clone(),
            region: p.region.clone(),
            handle: p.handle.clone(),
        }
    }
}

/// Response for POST /api/game/register
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub session_token: String,
    pub player: PlayerResponse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionsStateResponse {
    pub solved_groups: Vec<ConnectionsGroup>,
    pub mistakes: u32,
    pub failed: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrosswordStateResponse {
    pub completed: bool,
    pub failed: bool,
    pub attempts: u32,
    pub cemented_cells: Vec<Cell>,
    pub current_grid: Grid,
}

/// Response for GET /api/game/state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateResponse {
    pub started_at: Option<DateTime<Utc>>,
    pub first_puzzle: Option<PuzzleKind>,
    pub connections: ConnectionsStateResponse,
    pub crossword: CrosswordStateResponse,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_time_ms: Option<i64>,
    pub failed: bool,
    pub finished: bool,
    pub server_time: DateTime<Utc>,
}

impl GameStateResponse {
    pub fn from_session(session: &GameSession, server_time: DateTime<Utc>) -> Self {
        Self {
            started_at: session.started_at,
            first_puzzle: session.first_puzzle,
            connections: ConnectionsStateResponse {
                solved_groups: session.connections.solved_groups.clone(),
                mistakes: session.connections.mistakes,
                failed: session.connections.failed,
                completed: session.connections.completed,
            },
            crossword: CrosswordStateResponse {
                completed: session.crossword.completed,
                failed: session.crossword.failed,
                attempts: session.crossword.attempts,
                cemented_cells: session.crossword.cemented_cells.clone(),
                current_grid: session.crossword.current_grid.clone(),
            },
            completed_at: session.completed_at,
            total_time_ms: session.total_time_ms,
            failed: session.failed,
            finished: session.is_finished(),
            server_time,
        }
    }
}

/// Request for POST /api/game/start-puzzle
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPuzzleRequest {
    pub puzzle: PuzzleKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionsBoardResponse {
    pub words: Vec<String>,
    pub num_groups: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrosswordBoardResponse {
    pub size: usize,
    pub grid: Grid,
    pub clues: CrosswordClues,
}

/// Response for POST /api/game/start-puzzle
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPuzzleResponse {
    pub started_at: DateTime<Utc>,
    pub server_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<ConnectionsBoardResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crossword: Option<CrosswordBoardResponse>,
}

impl From<StartPuzzleOutput> for StartPuzzleResponse {
    fn from(out: StartPuzzleOutput) -> Self {
        Self {
            started_at: out.started_at,
            server_time: out.server_time,
            connections: out.connections.map(|c| ConnectionsBoardResponse {
                words: c.words,
                num_groups: c.num_groups,
            }),
            crossword: out.crossword.map(|x| CrosswordBoardResponse {
                size: x.size,
                grid: x.grid,
                clues: x.clues,
            }),
        }
    }
}

/// Request for POST /api/game/connections/guess
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessRequest {
    pub words: Vec<String>,
}

/// Response for POST /api/game/connections/guess
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessResponse {
    pub correct: bool,
    pub already_solved: bool,
    pub near_miss: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
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

impl From<GuessOutput> for GuessResponse {
    fn from(out: GuessOutput) -> Self {
        Self {
            correct: out.correct,
            already_solved: out.already_solved,
            near_miss: out.near_miss,
            solved_group: out.solved_group,
            solved_groups: out.solved_groups,
            mistakes: out.mistakes,
            mistakes_remaining: out.mistakes_remaining,
            completed: out.completed,
            failed: out.failed,
            session_failed: out.session_failed,
            completed_at: out.completed_at,
            total_time_ms: out.total_time_ms,
        }
    }
}

/// Request for POST /api/game/connections/reorder
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub word_order: Vec<String>,
}

/// Request for POST /api/game/crossword/submit
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrosswordSubmitRequest {
    pub grid: Grid,
}

/// Response for POST /api/game/crossword/submit
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrosswordSubmitResponse {
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

impl From<CrosswordOutput> for CrosswordSubmitResponse {
    fn from(out: CrosswordOutput) -> Self {
        Self {
            correct: out.correct,
            wrong_cells: out.wrong_cells,
            cemented_cells: out.cemented_cells,
            attempts: out.attempts,
            attempts_remaining: out.attempts_remaining,
            completed: out.completed,
            failed: out.failed,
            session_failed: out.session_failed,
            completed_at: out.completed_at,
            total_time_ms: out.total_time_ms,
        }
    }
}

/// Response for POST /api/game/crossword/give-up
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiveUpResponse {
    pub failed: bool,
    pub session_failed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_time_ms: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntryResponse {
    pub rank: u32,
    pub name: String,
    pub region: String,
    pub handle: String,
    pub total_time_ms: i64,
}

impl From<LeaderboardEntry> for LeaderboardEntryResponse {
    fn from(e: LeaderboardEntry) -> Self {
        Self {
            rank: e.rank,
            name: e.name,
            region: e.region,
            handle: e.handle,
            total_time_ms: e.total_time_ms,
        }
    }
}

/// Response for GET /api/game/leaderboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntryResponse>,
}

/// Response for GET /api/admin/puzzle
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleStatusResponse {
    pub connections_set: bool,
    pub crossword_set: bool,
    pub ready: bool,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<ConnectionsPuzzle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crossword: Option<CrosswordPuzzle>,
}

/// Request for POST /api/admin/lock
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRequest {
    pub locked: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockResponse {
    pub locked: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveSummaryResponse {
    pub archive_id: Uuid,
    pub archived_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub player_count: i64,
}

impl From<ArchiveSummary> for ArchiveSummaryResponse {
    fn from(s: ArchiveSummary) -> Self {
        Self {
            archive_id: s.id,
            archived_on: s.archived_on,
            created_at: s.created_at,
            player_count: s.player_count,
        }
    }
}

/// Response for GET /api/admin/archives/{id} and POST /api/admin/archive
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveResponse {
    pub archive_id: Uuid,
    pub archived_on: NaiveDate,
    pub connections: ConnectionsPuzzle,
    pub crossword: CrosswordPuzzle,
    pub leaderboard: Vec<LeaderboardEntryResponse>,
    pub created_at: DateTime<Utc>,
}

impl From<GameArchive> for ArchiveResponse {
    fn from(a: GameArchive) -> Self {
        Self {
            archive_id: a.id,
            archived_on: a.archived_on,
            connections: a.connections,
            crossword: a.crossword,
            leaderboard: a.leaderboard.into_iter().map(Into::into).collect(),
            created_at: a.created_at,
        }
    }
}
