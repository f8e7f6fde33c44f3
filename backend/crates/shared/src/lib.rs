//! Shared Kernel - Domain-crossing minimal core
//!
//! The smallest common vocabulary shared by every crate in the
//! workspace:
//! - Unified error type and result aliases
//! - Type-safe entity ID wrappers
//!
//! **Design Principle**: only things that are hard to change and mean
//! the same thing in every domain belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
