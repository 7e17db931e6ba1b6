// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMS transport adapter trait.

use async_trait::async_trait;

use crate::error::LeadlineError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for the outbound SMS transport.
#[async_trait]
pub trait SmsAdapter: PluginAdapter {
    /// Sends `body` to `to` and returns the provider's delivery identifier,
    /// which ends up in `Message::external_ref`.
    async fn send(&self, to: &str, body: &str) -> Result<String, LeadlineError>;
}
