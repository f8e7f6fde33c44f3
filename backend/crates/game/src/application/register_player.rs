//! Register Player Use Case

use std::net::IpAddr;
use std::sync::Arc;

use crate::application::config::GameConfig;
use crate::domain::entities::Player;
use crate::domain::repository::{
    PlayerRepository, RateLimitRepository, SessionRepository, SettingsRepository,
};
use crate::error::{GameError, GameResult};

/// Input DTO for registration
#[derive(Debug, Clone)]
pub struct RegisterPlayerInput {
    pub name: String,
    pub region: String,
    pub handle: String,
}

/// Output DTO for registration
#[derive(Debug, Clone)]
pub struct RegisterPlayerOutput {
    pub player: Player,
}

/// Register Player Use Case
///
/// Creates the Player and its (lazy, blank) session row. Registration
/// is refused while the game is locked, and rate-limited per client
/// IP because it is the only unauthenticated write.
pub struct RegisterPlayerUseCase<P, S, T, R>
where
    P: PlayerRepository,
    S: SessionRepository,
    T: SettingsRepository,
    R: RateLimitRepository,
{
    player_repo: Arc<P>,
    session_repo: Arc<S>,
    settings_repo: Arc<T>,
    rate_limit_repo: Arc<R>,
    config: Arc<GameConfig>,
}

impl<P, S, T, R> RegisterPlayerUseCase<P, S, T, R>
where
    P: PlayerRepository,
    S: SessionRepository,
    T: SettingsRepository,
    R: RateLimitRepository,
{
    pub fn new(
        player_repo: Arc<P>,
        session_repo: Arc<S>,
        settings_repo: Arc<T>,
        rate_limit_repo: Arc<R>,
        config: Arc<GameConfig>,
    ) -> Self {
        Self {
            player_repo,
            session_repo,
            settings_repo,
            rate_limit_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        input: RegisterPlayerInput,
        client_ip: Option<IpAddr>,
    ) -> GameResult<RegisterPlayerOutput> {
        self.validate(&input)?;

        if self.settings_repo.game_locked().await? {
            return Err(GameError::GameLocked);
        }

        let rate_key = match client_ip {
            Some(ip) => format!("register:{ip}"),
            None => "register:unknown".to_string(),
        };
        let allowed = self
            .rate_limit_repo
            .check_rate(
                &rate_key,
                self.config.register_rate_max,
                self.config.register_rate_window_ms(),
            )
            .await?;
        if !allowed {
            return Err(GameError::RateLimited);
        }

        if self
            .player_repo
            .find_player_by_handle(&input.handle)
            .await?
            .is_some()
        {
            return Err(GameError::HandleTaken);
        }

        let token = platform::crypto::random_token(self.config.session_token_bytes);
        let player = Player::new(input.name, input.region, input.handle, token);

        self.player_repo.create_player(&player).await?;
        self.session_repo.get_or_create_session(player.id).await?;

        tracing::info!(player_id = %player.id, handle = %player.handle, "Player registered");

        Ok(RegisterPlayerOutput { player })
    }

    fn validate(&self, input: &RegisterPlayerInput) -> GameResult<()> {
        for (field, value) in [
            ("name", &input.name),
            ("region", &input.region),
            ("handle", &input.handle),
        ] {
            if value.trim().is_empty() {
                return Err(GameError::InvalidInput(format!("{field} is required")));
            }
            if value.len() > self.config.max_field_len {
                return Err(GameError::InvalidInput(format!(
                    "{field} must be {} characters or less",
                    self.config.max_field_len
                )));
            }
        }
        Ok(())
    }
}
