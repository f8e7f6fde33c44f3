//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Player, GameSession and its sub-states)
//! - Puzzle value objects (answer keys, archives, leaderboards)
//! - Domain services (the pure guess evaluator)
//! - Repository traits (interfaces)

pub mod entities;
pub mod puzzle;
pub mod repository;
pub mod services;
