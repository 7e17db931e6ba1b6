// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-lead operator overrides.

use async_trait::async_trait;

use crate::error::LeadlineError;
use crate::traits::adapter::PluginAdapter;
use crate::types::LeadId;

/// Caller-owned flags consulted on every inbound event.
///
/// Dev mode suppresses escalation (signals are still computed). A pause stops
/// automated replies entirely until an operator clears it.
#[async_trait]
pub trait OverrideStore: PluginAdapter {
    async fn is_dev_mode(&self, lead_id: &LeadId) -> Result<bool, LeadlineError>;

    async fn is_paused(&self, lead_id: &LeadId) -> Result<bool, LeadlineError>;
}
