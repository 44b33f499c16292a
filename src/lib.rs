//! MCP Thinking Server
//!
//! A Rust MCP server that grows a tree of thoughts for a question, one
//! inference call at a time, and persists every session in `SQLite`.
//!
//! # Features
//!
//! - Thinking sessions with a token ceiling, depth and branching limits
//! - Expansion, self-critique and sibling alternatives as separate operations
//! - An auto-expansion loop with pause and resume
//! - Built-in reasoning templates that pin the thought type per depth
//! - Per-session event streams for observers
//! - Final synthesis of the whole tree into a conclusion
//!
//! # Quick Start
//!
//! ```bash
//! ANTHROPIC_API_KEY=sk-ant-xxx ./mcp-thinking
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     stdin      ┌─────────────────┐
//! │ MCP client  │───────────────▶│  Tool router    │
//! │             │◀───────────────│  (server)       │
//! └─────────────┘     stdout     └────────┬────────┘
//!                                         │
//!                                         ▼
//!                                ┌─────────────────┐
//!                                │ ThinkingEngine  │──────▶ Anthropic API
//!                                └────────┬────────┘
//!                                         │
//!                                         ▼
//!                                      SQLite
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod anthropic;
pub mod config;
pub mod error;
pub mod heuristics;
pub mod prompts;
pub mod server;
pub mod storage;
pub mod templates;
pub mod thinking;
pub mod traits;

#[cfg(test)]
mod test_utils;
