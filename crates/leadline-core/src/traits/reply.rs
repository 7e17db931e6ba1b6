// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply provider trait for the language model that drafts SMS replies.

use async_trait::async_trait;

use crate::error::LeadlineError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for the language model. Takes a fully rendered prompt and returns
/// reply text; token capping and retries are the implementation's business.
#[async_trait]
pub trait ReplyProvider: PluginAdapter {
    async fn generate(&self, prompt: &str) -> Result<String, LeadlineError>;
}
