// src/error.rs
use lettre::address::AddressError;
use thiserror::Error;

/// Fatal at startup, before any network call is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingEnv(Vec<String>),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Errors from the lead store (Airtable).
#[derive(Debug, Error)]
pub enum LeadStoreError {
    #[error("Authentication failed - check your API key")]
    Auth,

    #[error("Base or table not found - check your base ID and table name")]
    NotFound,

    #[error("Lead store returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Network error connecting to the lead store: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response format from the lead store: {0}")]
    InvalidResponse(String),
}

/// Errors from the message generation service (Anthropic).
///
/// Only `RateLimited` is retryable; everything else surfaces immediately.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Missing {0} for message generation")]
    MissingField(&'static str),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Generation service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Network error connecting to the generation service: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("Invalid response format from the generation service: {0}")]
    InvalidResponse(String),
}

/// Errors from the SMTP email dispatcher.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Invalid email input: {0}")]
    InvalidInput(String),

    #[error("Invalid mailbox address: {0}")]
    Address(#[from] AddressError),

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Errors from the task tracker (ClickUp). 401 and 404 are distinguished for
/// diagnostics but propagate through the same enum.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Invalid task input: {0}")]
    InvalidInput(String),

    #[error("Authentication failed - check your API key")]
    Auth,

    #[error("List or task not found - check your list ID")]
    NotFound,

    #[error("Task tracker returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Network error connecting to the task tracker: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response format from the task tracker: {0}")]
    InvalidResponse(String),
}
