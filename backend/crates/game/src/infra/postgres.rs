//! PostgreSQL Repository Implementations

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{
    ConnectionsState, CrosswordState, GameSession, Player, PuzzleKind,
};
use crate::domain::puzzle::{
    ActivePuzzle, ArchiveSummary, ConnectionsPuzzle, CrosswordPuzzle, GameArchive,
};
use crate::domain::repository::{
    ActivePuzzleRepository, ArchiveRepository, PlayerRepository, RateLimitRepository,
    SessionRepository, SettingsRepository,
};
use crate::domain::services::{rank_leaderboard, FinishedSession};
use crate::error::{GameError, GameResult};

/// Advisory lock key serializing archive/reset transactions.
const ARCHIVE_LOCK_KEY: i64 = 918_273;

const RATE_LIMIT_RETENTION_MS: i64 = 3600_000; // 1 hour

/// PostgreSQL-backed repository
#[derive(Clone)]
pub struct PgGameRepository {
    pool: PgPool,
}

impl PgGameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Drop rate-limit windows older than the retention horizon.
    pub async fn cleanup_stale_rate_limits(&self) -> GameResult<u64> {
        let horizon = Utc::now().timestamp_millis() - RATE_LIMIT_RETENTION_MS;

        let deleted = sqlx::query("DELETE FROM rate_limits WHERE window_start_ms < $1")
            .bind(horizon)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(rate_limits = deleted, "Cleaned up stale rate-limit windows");

        Ok(deleted)
    }
}

impl PlayerRepository for PgGameRepository {
    async fn create_player(&self, player: &Player) -> GameResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO players (
                player_id,
                name,
                region,
                handle,
                session_token,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(player.id)
        .bind(&player.name)
        .bind(&player.region)
        .bind(&player.handle)
        .bind(&player.session_token)
        .bind(player.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                tracing::info!(player_id = %player.id, handle = %player.handle, "Player created");
                Ok(())
            }
            // Two registrations for the same handle can pass the
            // pre-check together; the unique index settles the race.
            Err(e) if is_unique_violation(&e) => Err(GameError::HandleTaken),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_player_by_token(&self, token: &str) -> GameResult<Option<Player>> {
        let row = sqlx::query_as::<_, PlayerRow>(
            r#"
            SELECT player_id, name, region, handle, session_token, created_at
            FROM players
            WHERE session_token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PlayerRow::into_player))
    }

    async fn find_player_by_handle(&self, handle: &str) -> GameResult<Option<Player>> {
        let row = sqlx::query_as::<_, PlayerRow>(
            r#"
            SELECT player_id, name, region, handle, session_token, created_at
            FROM players
            WHERE LOWER(handle) = LOWER($1)
            "#,
        )
        .bind(handle)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PlayerRow::into_player))
    }
}

impl SessionRepository for PgGameRepository {
    async fn get_or_create_session(&self, player_id: Uuid) -> GameResult<GameSession> {
        let blank = GameSession::new(player_id);

        sqlx::query(
            r#"
            INSERT INTO game_sessions (
                session_id,
                player_id,
                connections_state,
                crossword_state,
                connections_completed,
                crossword_completed,
                failed
            ) VALUES ($1, $2, $3, $4, FALSE, FALSE, FALSE)
            ON CONFLICT (player_id) DO NOTHING
            "#,
        )
        .bind(blank.id)
        .bind(blank.player_id)
        .bind(serde_json::to_value(&blank.connections)?)
        .bind(serde_json::to_value(&blank.crossword)?)
        .execute(&self.pool)
        .await?;

        self.find_session(player_id)
            .await?
            .ok_or(GameError::SessionNotFound)
    }

    async fn find_session(&self, player_id: Uuid) -> GameResult<Option<GameSession>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                session_id,
                player_id,
                started_at,
                first_puzzle,
                connections_state,
                crossword_state,
                completed_at,
                total_time_ms,
                failed
            FROM game_sessions
            WHERE player_id = $1
            "#,
        )
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SessionRow::into_session).transpose()
    }

    async fn update_session_locked<T, F>(&self, player_id: Uuid, apply: F) -> GameResult<T>
    where
        T: Send,
        F: FnOnce(&mut GameSession) -> GameResult<T> + Send,
    {
        let mut tx = self.pool.begin().await?;

        // The fresh read happens after the row lock is held, so two
        // concurrent requests for the same player serialize and the
        // second sees the first's writes.
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                session_id,
                player_id,
                started_at,
                first_puzzle,
                connections_state,
                crossword_state,
                completed_at,
                total_time_ms,
                failed
            FROM game_sessions
            WHERE player_id = $1
            FOR UPDATE
            "#,
        )
        .bind(player_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(GameError::SessionNotFound)?;

        let mut session = row.into_session()?;
        let output = apply(&mut session)?;

        sqlx::query(
            r#"
            UPDATE game_sessions SET
                started_at = $2,
                first_puzzle = $3,
                connections_state = $4,
                crossword_state = $5,
                connections_completed = $6,
                crossword_completed = $7,
                completed_at = $8,
                total_time_ms = $9,
                failed = $10
            WHERE player_id = $1
            "#,
        )
        .bind(player_id)
        .bind(session.started_at)
        .bind(session.first_puzzle.map(|k| k.as_str()))
        .bind(serde_json::to_value(&session.connections)?)
        .bind(serde_json::to_value(&session.crossword)?)
        .bind(session.connections.completed)
        .bind(session.crossword.completed)
        .bind(session.completed_at)
        .bind(session.total_time_ms)
        .bind(session.failed)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(output)
    }
}

impl ActivePuzzleRepository for PgGameRepository {
    async fn get_active_puzzle(&self) -> GameResult<ActivePuzzle> {
        let row = sqlx::query_as::<_, ActivePuzzleRow>(
            "SELECT connections_data, crossword_data, updated_at FROM active_puzzle WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => r.into_active_puzzle(),
            None => Ok(ActivePuzzle {
                connections: None,
                crossword: None,
                updated_at: Utc::now(),
            }),
        }
    }

    async fn set_active_connections(&self, puzzle: &ConnectionsPuzzle) -> GameResult<()> {
        sqlx::query(
            r#"
            INSERT INTO active_puzzle (id, connections_data, updated_at)
            VALUES (1, $1, NOW())
            ON CONFLICT (id)
            DO UPDATE SET connections_data = $1, updated_at = NOW()
            "#,
        )
        .bind(serde_json::to_value(puzzle)?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_active_crossword(&self, puzzle: &CrosswordPuzzle) -> GameResult<()> {
        sqlx::query(
            r#"
            INSERT INTO active_puzzle (id, crossword_data, updated_at)
            VALUES (1, $1, NOW())
            ON CONFLICT (id)
            DO UPDATE SET crossword_data = $1, updated_at = NOW()
            "#,
        )
        .bind(serde_json::to_value(puzzle)?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl ArchiveRepository for PgGameRepository {
    async fn archive_and_reset(&self, archived_on: NaiveDate) -> GameResult<GameArchive> {
        let mut tx = self.pool.begin().await?;

        // Serialize concurrent resets; the lock releases with the
        // transaction.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ARCHIVE_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, ActivePuzzleRow>(
            r#"
            SELECT connections_data, crossword_data, updated_at
            FROM active_puzzle
            WHERE id = 1
            FOR UPDATE
            "#,
        )
        .fetch_optional(&mut *tx)
        .await?;

        let (connections, crossword) = match row {
            Some(ActivePuzzleRow {
                connections_data: Some(c),
                crossword_data: Some(x),
                ..
            }) => (
                serde_json::from_value::<ConnectionsPuzzle>(c)?,
                serde_json::from_value::<CrosswordPuzzle>(x)?,
            ),
            _ => return Err(GameError::PuzzleIncomplete),
        };

        let finishers = sqlx::query_as::<_, FinisherRow>(
            r#"
            SELECT p.name, p.region, p.handle, s.total_time_ms
            FROM game_sessions s
            JOIN players p ON p.player_id = s.player_id
            WHERE s.completed_at IS NOT NULL
              AND s.failed = FALSE
              AND s.connections_completed
              AND s.crossword_completed
              AND s.total_time_ms IS NOT NULL
            ORDER BY s.total_time_ms ASC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let leaderboard = rank_leaderboard(
            finishers
                .into_iter()
                .map(|f| FinishedSession {
                    name: f.name,
                    region: f.region,
                    handle: f.handle,
                    total_time_ms: f.total_time_ms,
                })
                .collect(),
        );

        let archive_id = Uuid::new_v4();
        let created_at = sqlx::query_scalar::<_, chrono::DateTime<Utc>>(
            r#"
            INSERT INTO game_archives (
                archive_id,
                archived_on,
                connections_data,
                crossword_data,
                leaderboard
            ) VALUES ($1, $2, $3, $4, $5)
            RETURNING created_at
            "#,
        )
        .bind(archive_id)
        .bind(archived_on)
        .bind(serde_json::to_value(&connections)?)
        .bind(serde_json::to_value(&crossword)?)
        .bind(serde_json::to_value(&leaderboard)?)
        .fetch_one(&mut *tx)
        .await?;

        let sessions_deleted = sqlx::query("DELETE FROM game_sessions")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let players_deleted = sqlx::query("DELETE FROM players")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query(
            r#"
            UPDATE active_puzzle
            SET connections_data = NULL, crossword_data = NULL, updated_at = NOW()
            WHERE id = 1
            "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            archive_id = %archive_id,
            players = players_deleted,
            sessions = sessions_deleted,
            "Cycle state archived and wiped"
        );

        Ok(GameArchive {
            id: archive_id,
            archived_on,
            connections,
            crossword,
            leaderboard,
            created_at,
        })
    }

    async fn list_archives(&self) -> GameResult<Vec<ArchiveSummary>> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT
                archive_id,
                archived_on,
                created_at,
                jsonb_array_length(leaderboard)::BIGINT AS player_count
            FROM game_archives
            ORDER BY archived_on DESC, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SummaryRow::into_summary).collect())
    }

    async fn find_archive(&self, id: Uuid) -> GameResult<Option<GameArchive>> {
        let row = sqlx::query_as::<_, ArchiveRow>(
            r#"
            SELECT archive_id, archived_on, connections_data, crossword_data, leaderboard, created_at
            FROM game_archives
            WHERE archive_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ArchiveRow::into_archive).transpose()
    }

    async fn latest_archive(&self) -> GameResult<Option<GameArchive>> {
        let row = sqlx::query_as::<_, ArchiveRow>(
            r#"
            SELECT archive_id, archived_on, connections_data, crossword_data, leaderboard, created_at
            FROM game_archives
            ORDER BY archived_on DESC, created_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(ArchiveRow::into_archive).transpose()
    }
}

impl SettingsRepository for PgGameRepository {
    async fn game_locked(&self) -> GameResult<bool> {
        let value = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT value FROM game_settings WHERE key = 'game_locked'",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    async fn set_game_locked(&self, locked: bool) -> GameResult<()> {
        sqlx::query(
            r#"
            INSERT INTO game_settings (key, value, updated_at)
            VALUES ('game_locked', $1, NOW())
            ON CONFLICT (key)
            DO UPDATE SET value = $1, updated_at = NOW()
            "#,
        )
        .bind(serde_json::Value::Bool(locked))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl RateLimitRepository for PgGameRepository {
    async fn check_rate(&self, key: &str, max_requests: u32, window_ms: i64) -> GameResult<bool> {
        let now_ms = Utc::now().timestamp_millis();
        let window_start = (now_ms / window_ms) * window_ms;

        let row = sqlx::query_as::<_, (i32,)>(
            r#"
            INSERT INTO rate_limits (key, window_start_ms, request_count)
            VALUES ($1, $2, 1)
            ON CONFLICT (key, window_start_ms)
            DO UPDATE SET request_count = rate_limits.request_count + 1
            RETURNING request_count
            "#,
        )
        .bind(key)
        .bind(window_start)
        .fetch_one(&self.pool)
        .await?;

        let count = row.0 as u32;
        let allowed = count <= max_requests;

        if !allowed {
            tracing::warn!(key = key, count = count, max = max_requests, "Rate limit exceeded");
        }

        Ok(allowed)
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505")
}

// Internal row types for sqlx mapping
#[derive(sqlx::FromRow)]
struct PlayerRow {
    player_id: Uuid,
    name: String,
    region: String,
    handle: String,
    session_token: String,
    created_at: chrono::DateTime<Utc>,
}

impl PlayerRow {
    fn into_player(self) -> Player {
        Player {
            id: self.player_id,
            name: self.name,
            region: self.region,
            handle: self.handle,
            session_token: self.session_token,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: Uuid,
    player_id: Uuid,
    started_at: Option<chrono::DateTime<Utc>>,
    first_puzzle: Option<String>,
    connections_state: serde_json::Value,
    crossword_state: serde_json::Value,
    completed_at: Option<chrono::DateTime<Utc>>,
    total_time_ms: Option<i64>,
    failed: bool,
}

impl SessionRow {
    fn into_session(self) -> GameResult<GameSession> {
        Ok(GameSession {
            id: self.session_id,
            player_id: self.player_id,
            started_at: self.started_at,
            first_puzzle: self.first_puzzle.as_deref().and_then(PuzzleKind::parse),
            connections: serde_json::from_value::<ConnectionsState>(self.connections_state)?,
            crossword: serde_json::from_value::<CrosswordState>(self.crossword_state)?,
            completed_at: self.completed_at,
            total_time_ms: self.total_time_ms,
            failed: self.failed,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ActivePuzzleRow {
    connections_data: Option<serde_json::Value>,
    crossword_data: Option<serde_json::Value>,
    updated_at: chrono::DateTime<Utc>,
}

impl ActivePuzzleRow {
    fn into_active_puzzle(self) -> GameResult<ActivePuzzle> {
        Ok(ActivePuzzle {
            connections: self
                .connections_data
                .map(serde_json::from_value::<ConnectionsPuzzle>)
                .transpose()?,
            crossword: self
                .crossword_data
                .map(serde_json::from_value::<CrosswordPuzzle>)
                .transpose()?,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct FinisherRow {
    name: String,
    region: String,
    handle: String,
    total_time_ms: i64,
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    archive_id: Uuid,
    archived_on: NaiveDate,
    created_at: chrono::DateTime<Utc>,
    player_count: i64,
}

impl SummaryRow {
    fn into_summary(self) -> ArchiveSummary {
        ArchiveSummary {
            id: self.archive_id,
            archived_on: self.archived_on,
            created_at: self.created_at,
            player_count: self.player_count,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ArchiveRow {
    archive_id: Uuid,
    archived_on: NaiveDate,
    connections_data: serde_json::Value,
    crossword_data: serde_json::Value,
    leaderboard: serde_json::Value,
    created_at: chrono::DateTime<Utc>,
}

impl ArchiveRow {
    fn into_archive(self) -> GameResult<GameArchive> {
        Ok(GameArchive {
            id: self.archive_id,
            archived_on: self.archived_on,
            connections: serde_json::from_value(self.connections_data)?,
            crossword: serde_json::from_value(self.crossword_data)?,
            leaderboard: serde_json::from_value(self.leaderboard)?,
            created_at: self.created_at,
        })
    }
}
