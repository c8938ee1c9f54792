//! # Cache Module
//!
//! In-memory caches sitting between the resolver and GitHub.
//!
//! ## Key Components
//!
//! - [`repositories`] - Time-bounded cache holding the whole repository list
//! - [`content`] - Keyed cache for file contents, never expired
//!
//! Both caches start empty and live exactly as long as their owner. Nothing
//! is persisted across restarts.

pub mod content;
pub mod repositories;

pub use content::{ContentCache, ContentKey};
pub use repositories::{CacheSnapshot, RepositoryCache};
