//! ensemble-ai: client for the remote character chat endpoint
//!
//! Wraps a single synchronous "generate the next utterance" HTTP call,
//! including bounded exponential backoff when the endpoint rate limits.

pub mod client;
pub mod error;
pub mod retry;
pub mod types;

pub use client::{API_KEY_ENV_VAR, ChaiClient, ClientConfig, DEFAULT_ENDPOINT, InferenceClient};
pub use error::{Error, Result};
pub use retry::RetryConfig;
pub use types::*;
