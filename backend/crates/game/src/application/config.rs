//! Application Configuration
//!
//! Tunable knobs for the game application layer. The puzzle-shape
//! thresholds (4 mistakes, 3 attempts, 4x4 groups, 5x5 grid) are an
//! external contract and live as constants in `domain::puzzle`, not
//! here.

use std::time::Duration;

/// Game application configuration
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Maximum length of name/region/handle fields
    pub max_field_len: usize,
    /// Maximum length of a single guessed word or grid cell
    pub max_word_len: usize,
    /// Session credential length in random bytes (pre-encoding)
    pub session_token_bytes: usize,
    /// Rate limit: guesses/submissions per player per window
    pub guess_rate_max: u32,
    /// Guess rate limit window
    pub guess_rate_window: Duration,
    /// Rate limit: registrations per client IP per window
    pub register_rate_max: u32,
    /// Registration rate limit window
    pub register_rate_window: Duration,
    /// Shared secret for the admin surface
    pub admin_key: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_field_len: 50,
            max_word_len: 100,
            session_token_bytes: 32,
            guess_rate_max: 30,
            guess_rate_window: Duration::from_secs(60),
            register_rate_max: 5,
            register_rate_window: Duration::from_secs(15 * 60),
            admin_key: String::new(),
        }
    }
}

impl GameConfig {
    /// Config with a random admin key (for development)
    pub fn with_random_admin_key() -> Self {
        Self {
            admin_key: platform::crypto::random_token(24),
            ..Default::default()
        }
    }

    /// Config with an operator-supplied admin key
    pub fn with_admin_key(admin_key: String) -> Self {
        Self {
            admin_key,
            ..Default::default()
        }
    }

    pub fn guess_rate_window_ms(&self) -> i64 {
        self.guess_rate_window.as_millis() as i64
    }

    pub fn register_rate_window_ms(&self) -> i64 {
        self.register_rate_window.as_millis() as i64
    }
}
