// Verse Graph - social-graph consistency layer for the verses publishing app

// Domain model - posts, likes, follows, comments, profiles
pub mod models;

// Storage seam - GraphStore trait and SQLite implementation
pub mod store;

// Graph logic - toggles, reconciliation, visibility, cascade, search
pub mod graph;

// HTTP surface
pub mod api;

// Common utilities
pub mod app_state;
pub mod config;
pub mod error;
pub mod id_generator;
pub mod viewer;

// Re-exports for convenience
pub use error::{AppError, AppResult};
