//! Unit tests for the game crate
//!
//! Use-case tests run against in-memory repository fakes so the whole
//! state machine is exercised without a database. The fakes mirror the
//! transactional contract: a closure error during a locked update
//! leaves the stored session untouched.

#[cfg(test)]
mod fakes {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use crate::domain::entities::{GameSession, Player};
    use crate::domain::puzzle::{
        ActivePuzzle, ArchiveSummary, ConnectionsPuzzle, CrosswordPuzzle, GameArchive,
    };
    use crate::domain::repository::{
        ActivePuzzleRepository, ArchiveRepository, PlayerRepository, RateLimitRepository,
        SessionRepository, SettingsRepository,
    };
    use crate::domain::services::{rank_leaderboard, FinishedSession};
    use crate::error::{GameError, GameResult};

    #[derive(Default)]
    pub struct MemState {
        pub players: Vec<Player>,
        pub sessions: HashMap<Uuid, GameSession>,
        pub connections: Option<ConnectionsPuzzle>,
        pub crossword: Option<CrosswordPuzzle>,
        pub archives: Vec<GameArchive>,
        pub locked: bool,
        pub rate_counts: HashMap<String, u32>,
    }

    /// In-memory stand-in for the PostgreSQL repository.
    #[derive(Clone, Default)]
    pub struct MemRepo {
        inner: Arc<Mutex<MemState>>,
    }

    impl MemRepo {
        pub fn with_state<T>(&self, f: impl FnOnce(&mut MemState) -> T) -> T {
            f(&mut self.inner.lock().unwrap())
        }
    }

    impl PlayerRepository for MemRepo {
        async fn create_player(&self, player: &Player) -> GameResult<()> {
            let mut state = self.inner.lock().unwrap();
            if state
                .players
                .iter()
                .any(|p| p.handle.eq_ignore_ascii_case(&player.handle))
            {
                return Err(GameError::HandleTaken);
            }
            state.players.push(player.clone());
            Ok(())
        }

        async fn find_player_by_token(&self, token: &str) -> GameResult<Option<Player>> {
            let state = self.inner.lock().unwrap();
            Ok(state
                .players
                .iter()
                .find(|p| p.session_token == token)
                .cloned())
        }

        async fn find_player_by_handle(&self, handle: &str) -> GameResult<Option<Player>> {
            let state = self.inner.lock().unwrap();
            Ok(state
                .players
                .iter()
                .find(|p| p.handle.eq_ignore_ascii_case(handle))
                .cloned())
        }
    }

    impl SessionRepository for MemRepo {
        async fn get_or_create_session(&self, player_id: Uuid) -> GameResult<GameSession> {
            let mut state = self.inner.lock().unwrap();
            Ok(state
                .sessions
                .entry(player_id)
                .or_insert_with(|| GameSession::new(player_id))
                .clone())
        }

        async fn find_session(&self, player_id: Uuid) -> GameResult<Option<GameSession>> {
            let state = self.inner.lock().unwrap();
            Ok(state.sessions.get(&player_id).cloned())
        }

        async fn update_session_locked<T, F>(&self, player_id: Uuid, apply: F) -> GameResult<T>
        where
            T: Send,
            F: FnOnce(&mut GameSession) -> GameResult<T> + Send,
        {
            let mut state = self.inner.lock().unwrap();
            let stored = state
                .sessions
                .get_mut(&player_id)
                .ok_or(GameError::SessionNotFound)?;

            // Apply on a copy so an Err leaves the stored row as-is,
            // like a rolled-back transaction.
            let mut working = stored.clone();
            let output = apply(&mut working)?;
            *stored = working;
            Ok(output)
        }
    }

    impl ActivePuzzleRepository for MemRepo {
        async fn get_active_puzzle(&self) -> GameResult<ActivePuzzle> {
            let state = self.inner.lock().unwrap();
            Ok(ActivePuzzle {
                connections: state.connections.clone(),
                crossword: state.crossword.clone(),
                updated_at: Utc::now(),
            })
        }

        async fn set_active_connections(&self, puzzle: &ConnectionsPuzzle) -> GameResult<()> {
            self.inner.lock().unwrap().connections = Some(puzzle.clone());
            Ok(())
        }

        async fn set_active_crossword(&self, puzzle: &CrosswordPuzzle) -> GameResult<()> {
            self.inner.lock().unwrap().crossword = Some(puzzle.clone());
            Ok(())
        }
    }

    impl ArchiveRepository for MemRepo {
        async fn archive_and_reset(&self, archived_on: NaiveDate) -> GameResult<GameArchive> {
            let mut state = self.inner.lock().unwrap();

            let (connections, crossword) = match (&state.connections, &state.crossword) {
                (Some(c), Some(x)) => (c.clone(), x.clone()),
                _ => return Err(GameError::PuzzleIncomplete),
            };

            let mut finishers: Vec<FinishedSession> = state
                .sessions
                .values()
                .filter(|s| !s.failed && s.connections.completed && s.crossword.completed)
                .filter_map(|s| {
                    let time = s.total_time_ms?;
                    let player = state.players.iter().find(|p| p.id == s.player_id)?;
                    Some(FinishedSession {
                        name: player.name.clone(),
                        region: player.region.clone(),
                        handle: player.handle.clone(),
                        total_time_ms: time,
                    })
                })
                .collect();
            finishers.sort_by_key(|f| f.total_time_ms);

            let archive = GameArchive {
                id: Uuid::new_v4(),
                archived_on,
                connections,
                crossword,
                leaderboard: rank_leaderboard(finishers),
                created_at: Utc::now(),
            };

            state.archives.push(archive.clone());
            state.sessions.clear();
            state.players.clear();
            state.connections = None;
            state.crossword = None;

            Ok(archive)
        }

        async fn list_archives(&self) -> GameResult<Vec<ArchiveSummary>> {
            let state = self.inner.lock().unwrap();
            let mut summaries: Vec<ArchiveSummary> = state
                .archives
                .iter()
                .map(|a| ArchiveSummary {
                    id: a.id,
                    archived_on: a.archived_on,
                    created_at: a.created_at,
                    player_count: a.leaderboard.len() as i64,
                })
                .collect();
            summaries.sort_by(|a, b| b.archived_on.cmp(&a.archived_on));
            Ok(summaries)
        }

        async fn find_archive(&self, id: Uuid) -> GameResult<Option<GameArchive>> {
            let state = self.inner.lock().unwrap();
            Ok(state.archives.iter().find(|a| a.id == id).cloned())
        }

        async fn latest_archive(&self) -> GameResult<Option<GameArchive>> {
            let state = self.inner.lock().unwrap();
            Ok(state.archives.last().cloned())
        }
    }

    impl SettingsRepository for MemRepo {
        async fn game_locked(&self) -> GameResult<bool> {
            Ok(self.inner.lock().unwrap().locked)
        }

        async fn set_game_locked(&self, locked: bool) -> GameResult<()> {
            self.inner.lock().unwrap().locked = locked;
            Ok(())
        }
    }

    impl RateLimitRepository for MemRepo {
        async fn check_rate(
            &self,
            key: &str,
            max_requests: u32,
            _window_ms: i64,
        ) -> GameResult<bool> {
            let mut state = self.inner.lock().unwrap();
            let count = state.rate_counts.entry(key.to_string()).or_insert(0);
            *count += 1;
            Ok(*count <= max_requests)
        }
    }
}

#[cfg(test)]
mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};

    use crate::domain::puzzle::{
        ClueDirection, ConnectionsGroup, ConnectionsPuzzle, CrosswordClue, CrosswordClues,
        CrosswordPuzzle, Grid, CROSSWORD_SIZE,
    };

    pub const ANSWER_ROWS: [&str; 5] = ["HEART", "ALERT", "STONE", "TIGER", "SNAKE"];

    pub fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 17, 0, 0).unwrap()
    }

    pub fn group(label: &str, words: [&str; 4], difficulty: u8) -> ConnectionsGroup {
        ConnectionsGroup {
            label: label.to_string(),
            words: words.iter().map(|w| w.to_string()).collect(),
            difficulty,
            color: "#f9df6d".to_string(),
        }
    }

    pub fn sample_connections() -> ConnectionsPuzzle {
        ConnectionsPuzzle {
            groups: vec![
                group("FISH", ["BASS", "FLOUNDER", "SALMON", "TROUT"], 1),
                group("GEMS", ["OPAL", "RUBY", "PEARL", "AMBER"], 2),
                group("COLORS", ["TEAL", "CORAL", "JADE", "ROSE"], 3),
                group("___ STONE", ["LIME", "KEY", "MILE", "STEPPING"], 4),
            ],
        }
    }

    pub fn grid_from(rows: [&str; 5]) -> Grid {
        rows.iter()
            .map(|row| row.chars().map(|c| Some(c.to_string())).collect())
            .collect()
    }

    pub fn sample_crossword() -> CrosswordPuzzle {
        let across = (0..CROSSWORD_SIZE as u32)
            .map(|i| CrosswordClue {
                number: i + 1,
                clue: format!("Row {} answer", i + 1),
                row: i as usize,
                col: 0,
                direction: ClueDirection::Across,
            })
            .collect();

        CrosswordPuzzle {
            size: CROSSWORD_SIZE,
            grid: grid_from(ANSWER_ROWS),
            clues: CrosswordClues {
                across,
                down: vec![],
            },
        }
    }
}

#[cfg(test)]
mod use_case_tests {
    use std::sync::Arc;

    use chrono::Duration;
    use platform::clock::{Clock, FixedClock};
    use uuid::Uuid;

    use super::fakes::MemRepo;
    use super::fixtures::{
        grid_from, sample_connections, sample_crossword, t0, ANSWER_ROWS,
    };
    use crate::application::archive_reset::ArchiveAndResetUseCase;
    use crate::application::archives::BrowseArchivesUseCase;
    use crate::application::config::GameConfig;
    use crate::application::give_up::GiveUpCrosswordUseCase;
    use crate::application::register_player::{RegisterPlayerInput, RegisterPlayerUseCase};
    use crate::application::reorder_words::ReorderWordsUseCase;
    use crate::application::start_puzzle::StartPuzzleUseCase;
    use crate::application::submit_crossword::SubmitCrosswordUseCase;
    use crate::application::submit_guess::SubmitGuessUseCase;
    use crate::domain::entities::PuzzleKind;
    use crate::error::GameError;

    struct Harness {
        repo: MemRepo,
        config: Arc<GameConfig>,
        fixed: Arc<FixedClock>,
        clock: Arc<dyn Clock>,
    }

    impl Harness {
        fn new() -> Self {
            let repo = MemRepo::default();
            repo.with_state(|s| {
                s.connections = Some(sample_connections());
                s.crossword = Some(sample_crossword());
            });
            let fixed = Arc::new(FixedClock::new(t0()));
            let clock: Arc<dyn Clock> = fixed.clone();
            Self {
                repo,
                config: Arc::new(GameConfig::with_admin_key("test-key".into())),
                fixed,
                clock,
            }
        }

        async fn register(&self, handle: &str) -> Uuid {
            let use_case = RegisterPlayerUseCase::new(
                Arc::new(self.repo.clone()),
                Arc::new(self.repo.clone()),
                Arc::new(self.repo.clone()),
                Arc::new(self.repo.clone()),
                self.config.clone(),
            );
            use_case
                .execute(
                    RegisterPlayerInput {
                        name: format!("Player {handle}"),
                        region: "Midwest".into(),
                        handle: handle.to_string(),
                    },
                    None,
                )
                .await
                .unwrap()
                .player
                .id
        }

        fn start_use_case(&self) -> StartPuzzleUseCase<MemRepo, MemRepo> {
            StartPuzzleUseCase::new(
                Arc::new(self.repo.clone()),
                Arc::new(self.repo.clone()),
                self.clock.clone(),
            )
        }

        fn guess_use_case(&self) -> SubmitGuessUseCase<MemRepo, MemRepo, MemRepo> {
            SubmitGuessUseCase::new(
                Arc::new(self.repo.clone()),
                Arc::new(self.repo.clone()),
                Arc::new(self.repo.clone()),
                self.config.clone(),
                self.clock.clone(),
            )
        }

        fn crossword_use_case(&self) -> SubmitCrosswordUseCase<MemRepo, MemRepo, MemRepo> {
            SubmitCrosswordUseCase::new(
                Arc::new(self.repo.clone()),
                Arc::new(self.repo.clone()),
                Arc::new(self.repo.clone()),
                self.config.clone(),
                self.clock.clone(),
            )
        }

        async fn start(&self, player_id: Uuid, kind: PuzzleKind) {
            self.start_use_case().execute(player_id, kind).await.unwrap();
        }
    }

    fn wrong_guess() -> Vec<String> {
        // Three fish and a gem
        ["BASS", "FLOUNDER", "SALMON", "OPAL"]
            .iter()
            .map(|w| w.to_string())
            .collect()
    }

    fn group_words(index: usize) -> Vec<String> {
        sample_connections().groups[index].words.clone()
    }

    #[tokio::test]
    async fn register_rejects_duplicate_handle() {
        let h = Harness::new();
        h.register("gridlock").await;

        let use_case = RegisterPlayerUseCase::new(
            Arc::new(h.repo.clone()),
            Arc::new(h.repo.clone()),
            Arc::new(h.repo.clone()),
            Arc::new(h.repo.clone()),
            h.config.clone(),
        );
        let err = use_case
            .execute(
                RegisterPlayerInput {
                    name: "Other".into(),
                    region: "East".into(),
                    handle: "GRIDLOCK".into(),
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::HandleTaken));
    }

    #[tokio::test]
    async fn register_refused_while_locked() {
        let h = Harness::new();
        h.repo.with_state(|s| s.locked = true);

        let use_case = RegisterPlayerUseCase::new(
            Arc::new(h.repo.clone()),
            Arc::new(h.repo.clone()),
            Arc::new(h.repo.clone()),
            Arc::new(h.repo.clone()),
            h.config.clone(),
        );
        let err = use_case
            .execute(
                RegisterPlayerInput {
                    name: "Late".into(),
                    region: "West".into(),
                    handle: "late".into(),
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::GameLocked));
    }

    #[tokio::test]
    async fn start_is_idempotent_across_both_puzzles() {
        let h = Harness::new();
        let player_id = h.register("starter").await;

        let first = h
            .start_use_case()
            .execute(player_id, PuzzleKind::Connections)
            .await
            .unwrap();

        h.fixed.advance(Duration::seconds(42));

        let second = h
            .start_use_case()
            .execute(player_id, PuzzleKind::Crossword)
            .await
            .unwrap();
        let third = h
            .start_use_case()
            .execute(player_id, PuzzleKind::Connections)
            .await
            .unwrap();

        assert_eq!(first.started_at, t0());
        assert_eq!(second.started_at, t0());
        assert_eq!(third.started_at, t0());
    }

    #[tokio::test]
    async fn start_returns_all_sixteen_words_and_keeps_order() {
        let h = Harness::new();
        let player_id = h.register("shuffler").await;

        let first = h
            .start_use_case()
            .execute(player_id, PuzzleKind::Connections)
            .await
            .unwrap();
        let words = first.connections.unwrap().words;
        assert_eq!(words.len(), 16);

        // Repeat call must not reshuffle the stored order.
        let second = h
            .start_use_case()
            .execute(player_id, PuzzleKind::Connections)
            .await
            .unwrap();
        assert_eq!(second.connections.unwrap().words, words);
    }

    #[tokio::test]
    async fn guess_before_start_is_rejected() {
        let h = Harness::new();
        let player_id = h.register("eager").await;

        let err = h
            .guess_use_case()
            .execute(player_id, wrong_guess())
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::NotStarted));
    }

    #[tokio::test]
    async fn correct_guess_solves_group_without_mistake() {
        let h = Harness::new();
        let player_id = h.register("solver").await;
        h.start(player_id, PuzzleKind::Connections).await;

        let out = h
            .guess_use_case()
            .execute(player_id, group_words(0))
            .await
            .unwrap();

        assert!(out.correct);
        assert!(!out.near_miss);
        assert_eq!(out.mistakes, 0);
        assert_eq!(out.solved_groups.len(), 1);
        assert_eq!(out.solved_group.unwrap().label, "FISH");
    }

    #[tokio::test]
    async fn near_miss_counts_as_mistake() {
        let h = Harness::new();
        let player_id = h.register("almost").await;
        h.start(player_id, PuzzleKind::Connections).await;

        let out = h
            .guess_use_case()
            .execute(player_id, wrong_guess())
            .await
            .unwrap();

        assert!(!out.correct);
        assert!(out.near_miss);
        assert_eq!(out.mistakes, 1);
        assert_eq!(out.mistakes_remaining, 3);
    }

    #[tokio::test]
    async fn repeating_a_solved_group_adds_no_mistake() {
        let h = Harness::new();
        let player_id = h.register("repeater").await;
        h.start(player_id, PuzzleKind::Connections).await;

        let guess = h.guess_use_case();
        guess.execute(player_id, group_words(1)).await.unwrap();

        let out = guess.execute(player_id, group_words(1)).await.unwrap();
        assert!(!out.correct);
        assert!(out.already_solved);
        assert_eq!(out.solved_group.unwrap().label, "GEMS");
        assert_eq!(out.mistakes, 0);
        assert_eq!(out.solved_groups.len(), 1);
    }

    #[tokio::test]
    async fn fourth_mistake_fails_connections_and_stamps_session() {
        let h = Harness::new();
        let player_id = h.register("stumped").await;
        h.start(player_id, PuzzleKind::Connections).await;
        h.fixed.advance(Duration::seconds(300));

        let guess = h.guess_use_case();
        for _ in 0..3 {
            let out = guess.execute(player_id, wrong_guess()).await.unwrap();
            assert!(!out.failed);
        }
        let out = guess.execute(player_id, wrong_guess()).await.unwrap();

        assert_eq!(out.mistakes, 4);
        assert!(out.failed);
        assert!(out.session_failed);
        assert_eq!(out.total_time_ms, Some(300_000));

        // The session is frozen; a retry returns the stored state
        // without adding a mistake.
        let retry = guess.execute(player_id, wrong_guess()).await.unwrap();
        assert!(!retry.correct);
        assert_eq!(retry.mistakes, 4);
        assert!(retry.session_failed);
        assert_eq!(retry.total_time_ms, Some(300_000));
    }

    #[tokio::test]
    async fn solving_all_groups_completes_connections() {
        let h = Harness::new();
        let player_id = h.register("sweeper").await;
        h.start(player_id, PuzzleKind::Connections).await;

        let guess = h.guess_use_case();
        for i in 0..4 {
            let out = guess.execute(player_id, group_words(i)).await.unwrap();
            assert_eq!(out.completed, i == 3);
        }

        let session = h.repo.with_state(|s| s.sessions[&player_id].clone());
        assert!(session.connections.completed);
        // Crossword still open, so no completion stamp yet.
        assert!(session.completed_at.is_none());
    }

    #[tokio::test]
    async fn concurrent_wrong_guesses_both_count() {
        let h = Harness::new();
        let player_id = h.register("racer").await;
        h.start(player_id, PuzzleKind::Connections).await;

        let guess = Arc::new(h.guess_use_case());
        let a = tokio::spawn({
            let guess = guess.clone();
            async move { guess.execute(player_id, wrong_guess()).await }
        });
        let b = tokio::spawn({
            let guess = guess.clone();
            async move { guess.execute(player_id, wrong_guess()).await }
        });
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let session = h.repo.with_state(|s| s.sessions[&player_id].clone());
        assert_eq!(session.connections.mistakes, 2);
    }

    #[tokio::test]
    async fn perfect_grid_completes_crossword() {
        let h = Harness::new();
        let player_id = h.register("acrosser").await;
        h.start(player_id, PuzzleKind::Crossword).await;
        h.fixed.advance(Duration::seconds(90));

        let out = h
            .crossword_use_case()
            .execute(player_id, grid_from(ANSWER_ROWS))
            .await
            .unwrap();

        assert!(out.correct);
        assert!(out.wrong_cells.is_empty());
        assert!(out.completed);
        assert!(!out.failed);
        assert_eq!(out.cemented_cells.len(), 25);
        // Connections still open.
        assert!(!out.session_failed);
        assert!(out.completed_at.is_none());
    }

    #[tokio::test]
    async fn retried_winning_submit_returns_frozen_state() {
        let h = Harness::new();
        let player_id = h.register("resender").await;
        h.start(player_id, PuzzleKind::Crossword).await;

        let submit = h.crossword_use_case();
        let first = submit
            .execute(player_id, grid_from(ANSWER_ROWS))
            .await
            .unwrap();
        assert!(first.completed);
        assert_eq!(first.attempts, 1);

        // Lost-response retry: the frozen state comes back unchanged
        // and no attempt is spent.
        let retry = submit
            .execute(player_id, grid_from(ANSWER_ROWS))
            .await
            .unwrap();
        assert!(retry.correct);
        assert!(retry.completed);
        assert_eq!(retry.attempts, 1);
        assert!(retry.wrong_cells.is_empty());
        assert_eq!(retry.cemented_cells, first.cemented_cells);
    }

    #[tokio::test]
    async fn cemented_cells_survive_a_worse_resubmission() {
        let h = Harness::new();
        let player_id = h.register("cementer").await;
        h.start(player_id, PuzzleKind::Crossword).await;

        let submit = h.crossword_use_case();

        // First row right, everything else wrong.
        let first = submit
            .execute(
                player_id,
                grid_from(["HEART", "XXXXX", "XXXXX", "XXXXX", "XXXXX"]),
            )
            .await
            .unwrap();
        assert_eq!(first.cemented_cells.len(), 5);
        assert_eq!(first.wrong_cells.len(), 20);

        // Second submission ruins row 0, but those cells stay cemented
        // and are not reported wrong.
        let second = submit
            .execute(
                player_id,
                grid_from(["ZZZZZ", "ALERT", "XXXXX", "XXXXX", "XXXXX"]),
            )
            .await
            .unwrap();
        assert_eq!(second.cemented_cells.len(), 10);
        assert!(second.wrong_cells.iter().all(|c| c.row >= 2));
        assert_eq!(second.wrong_cells.len(), 15);
    }

    #[tokio::test]
    async fn third_failed_attempt_fails_crossword_and_session() {
        let h = Harness::new();
        let player_id = h.register("gridless").await;
        h.start(player_id, PuzzleKind::Crossword).await;

        let submit = h.crossword_use_case();
        let bad = grid_from(["XXXXX", "XXXXX", "XXXXX", "XXXXX", "XXXXX"]);
        for _ in 0..2 {
            let out = submit.execute(player_id, bad.clone()).await.unwrap();
            assert!(!out.failed);
        }
        let out = submit.execute(player_id, bad).await.unwrap();

        assert_eq!(out.attempts, 3);
        assert_eq!(out.attempts_remaining, 0);
        assert!(out.failed);
        assert!(out.session_failed);
        assert!(out.completed_at.is_some());
    }

    #[tokio::test]
    async fn completion_stamp_is_written_once() {
        let h = Harness::new();
        let player_id = h.register("finisher").await;
        h.start(player_id, PuzzleKind::Connections).await;

        let guess = h.guess_use_case();
        for i in 0..4 {
            guess.execute(player_id, group_words(i)).await.unwrap();
        }

        h.fixed.advance(Duration::seconds(120));
        let out = h
            .crossword_use_case()
            .execute(player_id, grid_from(ANSWER_ROWS))
            .await
            .unwrap();

        assert!(!out.session_failed);
        assert_eq!(out.total_time_ms, Some(120_000));
        assert_eq!(out.completed_at, Some(t0() + Duration::seconds(120)));
    }

    #[tokio::test]
    async fn give_up_fails_session_and_is_idempotent() {
        let h = Harness::new();
        let player_id = h.register("quitter").await;
        h.start(player_id, PuzzleKind::Crossword).await;
        h.fixed.advance(Duration::seconds(30));

        let use_case =
            GiveUpCrosswordUseCase::new(Arc::new(h.repo.clone()), h.clock.clone());

        let first = use_case.execute(player_id).await.unwrap();
        assert!(first.failed);
        assert!(first.session_failed);
        assert_eq!(first.total_time_ms, Some(30_000));

        h.fixed.advance(Duration::seconds(30));
        let second = use_case.execute(player_id).await.unwrap();
        assert_eq!(second.completed_at, first.completed_at);
        assert_eq!(second.total_time_ms, first.total_time_ms);
    }

    #[tokio::test]
    async fn give_up_rejected_once_the_session_is_stamped() {
        let h = Harness::new();
        let player_id = h.register("doomed").await;
        h.start(player_id, PuzzleKind::Connections).await;

        // Mistake-limit failure stamps the session with the crossword
        // still open.
        let guess = h.guess_use_case();
        for _ in 0..4 {
            guess.execute(player_id, wrong_guess()).await.unwrap();
        }

        let use_case =
            GiveUpCrosswordUseCase::new(Arc::new(h.repo.clone()), h.clock.clone());
        let err = use_case.execute(player_id).await.unwrap_err();
        assert!(matches!(err, GameError::AlreadyFinished));

        let session = h.repo.with_state(|s| s.sessions[&player_id].clone());
        assert!(!session.crossword.failed);
    }

    #[tokio::test]
    async fn reorder_requires_a_permutation_of_unsolved_words() {
        let h = Harness::new();
        let player_id = h.register("arranger").await;
        h.start(player_id, PuzzleKind::Connections).await;

        let use_case =
            ReorderWordsUseCase::new(Arc::new(h.repo.clone()), Arc::new(h.repo.clone()));

        let mut order = sample_connections().all_words();
        order.reverse();
        use_case.execute(player_id, order.clone()).await.unwrap();

        let session = h.repo.with_state(|s| s.sessions[&player_id].clone());
        assert_eq!(session.connections.word_order, order);

        let err = use_case
            .execute(player_id, vec!["BASS".into(); 16])
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn archive_refuses_incomplete_puzzle_and_deletes_nothing() {
        let h = Harness::new();
        h.register("survivor").await;
        h.repo.with_state(|s| s.crossword = None);

        let use_case =
            ArchiveAndResetUseCase::new(Arc::new(h.repo.clone()), h.clock.clone());
        let err = use_case.execute().await.unwrap_err();
        assert!(matches!(err, GameError::PuzzleIncomplete));

        h.repo.with_state(|s| {
            assert_eq!(s.players.len(), 1);
            assert_eq!(s.sessions.len(), 1);
            assert!(s.archives.is_empty());
        });
    }

    #[tokio::test]
    async fn archive_ranks_finishers_and_wipes_the_cycle() {
        let h = Harness::new();

        // Fast finisher, slow finisher, and one failure.
        for (handle, seconds, fail) in
            [("fast", 60, false), ("slow", 600, false), ("flop", 30, true)]
        {
            let player_id = h.register(handle).await;
            h.start(player_id, PuzzleKind::Connections).await;

            if fail {
                let guess = h.guess_use_case();
                for _ in 0..4 {
                    guess.execute(player_id, wrong_guess()).await.unwrap();
                }
            } else {
                let guess = h.guess_use_case();
                for i in 0..4 {
                    guess.execute(player_id, group_words(i)).await.unwrap();
                }
                h.fixed.advance(Duration::seconds(seconds));
                h.crossword_use_case()
                    .execute(player_id, grid_from(ANSWER_ROWS))
                    .await
                    .unwrap();
            }
        }

        let use_case =
            ArchiveAndResetUseCase::new(Arc::new(h.repo.clone()), h.clock.clone());
        let archive = use_case.execute().await.unwrap();

        assert_eq!(archive.leaderboard.len(), 2);
        assert_eq!(archive.leaderboard[0].rank, 1);
        assert_eq!(archive.leaderboard[0].handle, "fast");
        assert_eq!(archive.leaderboard[1].rank, 2);
        assert_eq!(archive.leaderboard[1].handle, "slow");
        assert!(
            archive.leaderboard[0].total_time_ms <= archive.leaderboard[1].total_time_ms
        );

        h.repo.with_state(|s| {
            assert!(s.players.is_empty());
            assert!(s.sessions.is_empty());
            assert!(s.connections.is_none());
            assert!(s.crossword.is_none());
            assert_eq!(s.archives.len(), 1);
        });

        let browse = BrowseArchivesUseCase::new(Arc::new(h.repo.clone()));
        let leaderboard = browse.latest_leaderboard().await.unwrap();
        assert_eq!(leaderboard.len(), 2);
        let summaries = browse.list().await.unwrap();
        assert_eq!(summaries[0].player_count, 2);
    }
}

#[cfg(test)]
mod dto_tests {
    use crate::presentation::dto::*;

    #[test]
    fn test_register_request_deserialization() {
        let json = r#"{"name":"Rosa","region":"Southwest","handle":"rosa_w"}"#;
        let request: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.name, "Rosa");
        assert_eq!(request.handle, "rosa_w");
    }

    #[test]
    fn test_register_response_serialization() {
        let response = RegisterResponse {
            session_token: "tok".into(),
            player: PlayerResponse {
                player_id: uuid::Uuid::nil(),
                name: "Rosa".into(),
                region: "Southwest".into(),
                handle: "rosa_w".into(),
            },
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("sessionToken"));
        assert!(json.contains("playerId"));
    }

    #[test]
    fn test_leaderboard_entry_serialization() {
        let response = LeaderboardEntryResponse {
            rank: 1,
            name: "Rosa".into(),
            region: "Southwest".into(),
            handle: "rosa_w".into(),
            total_time_ms: 61_000,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""totalTimeMs":61000"#));
    }

    #[test]
    fn test_guess_request_deserialization() {
        let json = r#"{"words":["BASS","TROUT","SALMON","FLOUNDER"]}"#;
        let request: GuessRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.words.len(), 4);
    }
}

#[cfg(test)]
mod error_tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use crate::error::GameError;

    #[test]
    fn test_error_into_response_status_codes() {
        let cases: Vec<(GameError, StatusCode)> = vec![
            (GameError::MissingToken, StatusCode::UNAUTHORIZED),
            (GameError::InvalidToken, StatusCode::UNAUTHORIZED),
            (GameError::AdminKeyInvalid, StatusCode::UNAUTHORIZED),
            (GameError::GameLocked, StatusCode::FORBIDDEN),
            (GameError::HandleTaken, StatusCode::CONFLICT),
            (GameError::AlreadyFinished, StatusCode::CONFLICT),
            (GameError::PuzzleIncomplete, StatusCode::CONFLICT),
            (GameError::PuzzleUnavailable, StatusCode::NOT_FOUND),
            (GameError::ArchiveNotFound, StatusCode::NOT_FOUND),
            (GameError::NotStarted, StatusCode::BAD_REQUEST),
            (
                GameError::InvalidInput("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (GameError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (
                GameError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected);
        }
    }
}
