//! Core types and error definitions for Rolecast.
//!
//! This crate provides the foundational types shared across all Rolecast crates.
//!
//! # Main types
//!
//! - [`RolecastError`]: Unified error enum for all Rolecast subsystems.
//! - [`RolecastResult`]: Convenience alias for `Result<T, RolecastError>`.
//! - [`Role`]: Message role (user, assistant, system).
//! - [`Message`]: A single message sent to the model as conversation context.

/// Error taxonomy shared by every crate.
pub mod error;
/// Role-tagged chat messages.
pub mod message;

pub use error::{RolecastError, RolecastResult};
pub use message::{Message, Role};
