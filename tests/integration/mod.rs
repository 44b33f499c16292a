//! Engine workflow suites over in-memory storage and a scripted client.

mod auto_expand;
mod concurrency;
mod event_streams;
mod session_workflow;
