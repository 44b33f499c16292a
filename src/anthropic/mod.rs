//! Anthropic API client.
//!
//! This module provides:
//! - Direct Claude Messages API integration
//! - Retry logic with exponential backoff
//! - The [`InferenceClientTrait`](crate::traits::InferenceClientTrait) adapter
//!   used by the thinking engine
//!
//! # Example
//!
//! ```ignore
//! use mcp_thinking::anthropic::{AnthropicClient, ClientConfig};
//! use mcp_thinking::traits::{CompletionConfig, InferenceClientTrait, Message};
//!
//! let client = AnthropicClient::new("sk-ant-xxx", ClientConfig::default())?;
//! let response = client
//!     .complete(vec![Message::user("Hello")], CompletionConfig::new())
//!     .await?;
//! ```

mod client;
mod config;
mod types;

pub use client::{AnthropicClient, MAX_CONTENT_LENGTH, MAX_MESSAGES};
pub use config::{
    ClientConfig, DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_MS,
};
pub use types::{ApiErrorBody, ApiErrorDetails, ApiMessage, ApiRequest, ApiResponse, ApiUsage, ContentBlock};
