//! Core library modules for the banqueue engine.
//!
//! - `data_storage` resolves the platform-specific application data directory.
//! - `messages` centralizes all user-facing text behind a `Message` enum.
//! - `credentials`, `cache`, `classifier`, `retry_policy` and `recovery`
//!   implement the corresponding components of the processing engine.

pub mod cache;
pub mod classifier;
pub mod credentials;
pub mod data_storage;
pub mod messages;
pub mod recovery;
pub mod retry_policy;
