//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Token/randomness utilities (secure random bytes, Base64)
//! - Client IP extraction from request headers
//! - The injectable wall clock used for all duration math

pub mod client;
pub mod clock;
pub mod crypto;
