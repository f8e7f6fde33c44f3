pub mod admin;
pub mod archive_reset;
pub mod archives;
pub mod config;
pub mod game_state;
pub mod give_up;
pub mod register_player;
pub mod reorder_words;
pub mod start_puzzle;
pub mod submit_crossword;
pub mod submit_guess;
