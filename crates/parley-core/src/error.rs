// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every parley crate.

use thiserror::Error;

/// The primary error type used across collaborator traits and the engine.
#[derive(Debug, Error)]
pub enum ParleyError {
    /// Configuration errors (missing credentials, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// State store errors (database open, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Chat gateway errors (HTTP failure, API error result, malformed payload).
    #[error("gateway error: {message}")]
    Gateway {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Text generation errors (API failure, empty completion).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A draft could not be addressed (empty topic, no recipients).
    #[error("draft rejected: {reason}")]
    DraftRejected { reason: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ParleyError {
    /// Builds a gateway error without an underlying source.
    pub fn gateway(message: impl Into<String>) -> Self {
        ParleyError::Gateway {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a provider error without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        ParleyError::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a draft rejection.
    pub fn draft_rejected(reason: impl Into<String>) -> Self {
        ParleyError::DraftRejected {
            reason: reason.into(),
        }
    }
}
