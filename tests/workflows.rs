//! Workflow integration tests entry point.
//!
//! This module includes all engine workflow tests:
//! - Sessions: expand → critique → alternatives → synthesize
//! - Auto-expansion: start → grow → pause → resume → complete
//! - Event streams: fan-out, ordering, termination
//! - Concurrency: overlapping operations on one session

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;
mod integration;
