//! Storage backend.
//!
//! This module provides:
//! - `SQLite` database implementation
//! - Thinking session persistence
//! - Thought node persistence, with atomic tree commits
//! - Bookmarks
//!
//! # Architecture
//!
//! The storage layer uses `SQLite` with the `sqlx` crate for async operations.
//! Nested values (config, stats, children, metadata) are stored as JSON
//! documents; node creation order is the insertion order.
//!
//! The implementation is split across submodules:
//! - `core`: Pool management, migrations, and column helpers
//! - `session`: Session records
//! - `node`: Thought node records
//! - `bookmark`: Bookmark records
//! - `trait_impl`: `StorageTrait` implementation and tree commits
//!
//! # Example
//!
//! ```ignore
//! use mcp_thinking::storage::SqliteStorage;
//!
//! let storage = SqliteStorage::new("./data/thinking.db").await?;
//! let tree = storage.list_nodes("session-id").await?;
//! ```

mod bookmark;
mod core;
mod node;
mod session;
mod trait_impl;

pub use self::core::SqliteStorage;
