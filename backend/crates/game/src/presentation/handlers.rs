//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use platform::clock::Clock;
use platform::client::extract_client_ip;
use uuid::Uuid;

use crate::application::admin::{LockGameUseCase, SetPuzzleUseCase};
use crate::application::archive_reset::ArchiveAndResetUseCase;
use crate::application::archives::BrowseArchivesUseCase;
use crate::application::config::GameConfig;
use crate::application::game_state::GetGameStateUseCase;
use crate::application::give_up::GiveUpCrosswordUseCase;
use crate::application::register_player::{RegisterPlayerInput, RegisterPlayerUseCase};
use crate::application::reorder_words::ReorderWordsUseCase;
use crate::application::start_puzzle::StartPuzzleUseCase;
use crate::application::submit_crossword::SubmitCrosswordUseCase;
use crate::application::submit_guess::SubmitGuessUseCase;
use crate::domain::entities::Player;
use crate::domain::puzzle::{ConnectionsPuzzle, CrosswordPuzzle};
use crate::domain::repository::GameRepository;
use crate::error::{GameError, GameResult};
use crate::presentation::dto::{
    ArchiveResponse, ArchiveSummaryResponse, CrosswordSubmitRequest, CrosswordSubmitResponse,
    GameStateResponse, GiveUpResponse, GuessRequest, GuessResponse, LeaderboardResponse,
    LockRequest, LockResponse, PuzzleStatusResponse, RegisterRequest, RegisterResponse,
    ReorderRequest, StartPuzzleRequest, StartPuzzleResponse,
};

pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Shared state for game handlers
#[derive(Clone)]
pub struct GameAppState<R>
where
    R: GameRepository,
{
    pub repo: Arc<R>,
    pub config: Arc<GameConfig>,
    pub clock: Arc<dyn Clock>,
}

/// Resolve the request's player from the session credential header.
async fn authenticate<R>(state: &GameAppState<R>, headers: &HeaderMap) -> GameResult<Player>
where
    R: GameRepository,
{
    let token = headers
        .get(SESSION_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(GameError::MissingToken)?;

    state
        .repo
        .find_player_by_token(token)
        .await?
        .ok_or(GameError::InvalidToken)
}

/// Refuse mutating play while the operator lock is on.
async fn ensure_open<R>(state: &GameAppState<R>) -> GameResult<()>
where
    R: GameRepository,
{
    if state.repo.game_locked().await? {
        return Err(GameError::GameLocked);
    }
    Ok(())
}

/// POST /api/game/register
pub async fn register<R>(
    State(state): State<GameAppState<R>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<std::net::SocketAddr>,
    Json(req): Json<RegisterRequest>,
) -> GameResult<(StatusCode, Json<RegisterResponse>)>
where
    R: GameRepository,
{
    let client_ip = extract_client_ip(&headers, Some(addr.ip()));

    let use_case = RegisterPlayerUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(
            RegisterPlayerInput {
                name: req.name,
                region: req.region,
                handle: req.handle,
            },
            client_ip,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            session_token: output.player.session_token.clone(),
            player: (&output.player).into(),
        }),
    ))
}

/// GET /api/game/state
pub async fn game_state<R>(
    State(state): State<GameAppState<R>>,
    headers: HeaderMap,
) -> GameResult<Json<GameStateResponse>>
where
    R: GameRepository,
{
    let player = authenticate(&state, &headers).await?;

    let use_case = GetGameStateUseCase::new(state.repo.clone());
    let session = use_case
        .execute(player.id)
        .await?
        .ok_or(GameError::SessionNotFound)?;

    Ok(Json(GameStateResponse::from_session(
        &session,
        state.clock.now(),
    )))
}

/// POST /api/game/start-puzzle
pub async fn start_puzzle<R>(
    State(state): State<GameAppState<R>>,
    headers: HeaderMap,
    Json(req): Json<StartPuzzleRequest>,
) -> GameResult<Json<StartPuzzleResponse>>
where
    R: GameRepository,
{
    let player = authenticate(&state, &headers).await?;
    ensure_open(&state).await?;

    let use_case =
        StartPuzzleUseCase::new(state.repo.clone(), state.repo.clone(), state.clock.clone());
    let output = use_case.execute(player.id, req.puzzle).await?;

    Ok(Json(output.into()))
}

/// POST /api/game/connections/guess
pub async fn submit_guess<R>(
    State(state): State<GameAppState<R>>,
    headers: HeaderMap,
    Json(req): Json<GuessRequest>,
) -> GameResult<Json<GuessResponse>>
where
    R: GameRepository,
{
    let player = authenticate(&state, &headers).await?;
    ensure_open(&state).await?;

    let use_case = SubmitGuessUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
        state.clock.clone(),
    );
    let output = use_case.execute(player.id, req.words).await?;

    Ok(Json(output.into()))
}

/// POST /api/game/connections/reorder
pub async fn reorder_words<R>(
    State(state): State<GameAppState<R>>,
    headers: HeaderMap,
    Json(req): Json<ReorderRequest>,
) -> GameResult<StatusCode>
where
    R: GameRepository,
{
    let player = authenticate(&state, &headers).await?;
    ensure_open(&state).await?;

    let use_case = ReorderWordsUseCase::new(state.repo.clone(), state.repo.clone());
    use_case.execute(player.id, req.word_order).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/game/crossword/submit
pub async fn submit_crossword<R>(
    State(state): State<GameAppState<R>>,
    headers: HeaderMap,
    Json(req): Json<CrosswordSubmitRequest>,
) -> GameResult<Json<CrosswordSubmitResponse>>
where
    R: GameRepository,
{
    let player = authenticate(&state, &headers).await?;
    ensure_open(&state).await?;

    let use_case = SubmitCrosswordUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
        state.clock.clone(),
    );
    let output = use_case.execute(player.id, req.grid).await?;

    Ok(Json(output.into()))
}

/// POST /api/game/crossword/give-up
pub async fn give_up_crossword<R>(
    State(state): State<GameAppState<R>>,
    headers: HeaderMap,
) -> GameResult<Json<GiveUpResponse>>
where
    R: GameRepository,
{
    let player = authenticate(&state, &headers).await?;
    ensure_open(&state).await?;

    let use_case = GiveUpCrosswordUseCase::new(state.repo.clone(), state.clock.clone());
    let output = use_case.execute(player.id).await?;

    Ok(Json(GiveUpResponse {
        failed: output.failed,
        session_failed: output.session_failed,
        completed_at: output.completed_at,
        total_time_ms: output.total_time_ms,
    }))
}

/// GET /api/game/leaderboard
pub async fn leaderboard<R>(
    State(state): State<GameAppState<R>>,
) -> GameResult<Json<LeaderboardResponse>>
where
    R: GameRepository,
{
    let use_case = BrowseArchivesUseCase::new(state.repo.clone());
    let entries = use_case.latest_leaderboard().await?;

    Ok(Json(LeaderboardResponse {
        leaderboard: entries.into_iter().map(Into::into).collect(),
    }))
}

/// PUT /api/admin/puzzle/connections
pub async fn set_connections_puzzle<R>(
    State(state): State<GameAppState<R>>,
    Json(puzzle): Json<ConnectionsPuzzle>,
) -> GameResult<StatusCode>
where
    R: GameRepository,
{
    let use_case = SetPuzzleUseCase::new(state.repo.clone());
    use_case.set_connections(puzzle).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/admin/puzzle/crossword
pub async fn set_crossword_puzzle<R>(
    State(state): State<GameAppState<R>>,
    Json(puzzle): Json<CrosswordPuzzle>,
) -> GameResult<StatusCode>
where
    R: GameRepository,
{
    let use_case = SetPuzzleUseCase::new(state.repo.clone());
    use_case.set_crossword(puzzle).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/puzzle
pub async fn puzzle_status<R>(
    State(state): State<GameAppState<R>>,
) -> GameResult<Json<PuzzleStatusResponse>>
where
    R: GameRepository,
{
    let use_case = SetPuzzleUseCase::new(state.repo.clone());
    let (active, status) = use_case.status().await?;

    Ok(Json(PuzzleStatusResponse {
        connections_set: status.connections_set,
        crossword_set: status.crossword_set,
        ready: status.ready,
        updated_at: status.updated_at,
        connections: active.connections,
        crossword: active.crossword,
    }))
}

/// POST /api/admin/lock
pub async fn set_lock<R>(
    State(state): State<GameAppState<R>>,
    Json(req): Json<LockRequest>,
) -> GameResult<Json<LockResponse>>
where
    R: GameRepository,
{
    let use_case = LockGameUseCase::new(state.repo.clone());
    let locked = use_case.set_locked(req.locked).await?;

    Ok(Json(LockResponse { locked }))
}

/// GET /api/admin/lock
pub async fn get_lock<R>(
    State(state): State<GameAppState<R>>,
) -> GameResult<Json<LockResponse>>
where
    R: GameRepository,
{
    let use_case = LockGameUseCase::new(state.repo.clone());
    let locked = use_case.locked().await?;

    Ok(Json(LockResponse { locked }))
}

/// POST /api/admin/archive
pub async fn archive_and_reset<R>(
    State(state): State<GameAppState<R>>,
) -> GameResult<(StatusCode, Json<ArchiveResponse>)>
where
    R: GameRepository,
{
    let use_case = ArchiveAndResetUseCase::new(state.repo.clone(), state.clock.clone());
    let archive = use_case.execute().await?;

    Ok((StatusCode::CREATED, Json(archive.into())))
}

/// GET /api/admin/archives
pub async fn list_archives<R>(
    State(state): State<GameAppState<R>>,
) -> GameResult<Json<Vec<ArchiveSummaryResponse>>>
where
    R: GameRepository,
{
    let use_case = BrowseArchivesUseCase::new(state.repo.clone());
    let summaries = use_case.list().await?;

    Ok(Json(summaries.into_iter().map(Into::into).collect()))
}

/// GET /api/admin/archives/{id}
pub async fn get_archive<R>(
    State(state): State<GameAppState<R>>,
    Path(id): Path<Uuid>,
) -> GameResult<Json<ArchiveResponse>>
where
    R: GameRepository,
{
    let use_case = BrowseArchivesUseCase::new(state.repo.clone());
    let archive = use_case.get(id.into()).await?;

    Ok(Json(archive.into()))
}
