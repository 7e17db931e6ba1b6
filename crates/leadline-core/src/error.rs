// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Leadline SMS lead assistant.
//!
//! The transcript, qualification and context functions never fail: malformed
//! or oversized data degrades locally. These errors belong to the boundary
//! where the pipeline talks to the CRM, the SMS transport and the reply model.

use thiserror::Error;

use crate::types::LeadId;

/// The primary error type used across the collaborator traits and the pipeline.
#[derive(Debug, Error)]
pub enum LeadlineError {
    /// Configuration errors (invalid TOML, missing template file, bad limits).
    #[error("configuration error: {0}")]
    Config(String),

    /// CRM read or write failures.
    #[error("crm error: {message}")]
    Crm {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// SMS transport failures (rejected destination, provider outage).
    #[error("sms error: {message}")]
    Sms {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Reply provider failures (API failure, empty completion).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The CRM has no record under this lead id.
    #[error("lead {lead_id} not found")]
    LeadNotFound { lead_id: LeadId },

    /// Prompt template could not be parsed or rendered.
    #[error("template error: {0}")]
    Template(String),

    /// JSON serialization failures outside the tolerant decode path.
    #[error("serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LeadlineError {
    /// Shorthand for a CRM error without an underlying cause.
    pub fn crm(message: impl Into<String>) -> Self {
        LeadlineError::Crm {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for an SMS error without an underlying cause.
    pub fn sms(message: impl Into<String>) -> Self {
        LeadlineError::Sms {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a provider error without an underlying cause.
    pub fn provider(message: impl Into<String>) -> Self {
        LeadlineError::Provider {
            message: message.into(),
            source: None,
        }
    }
}
