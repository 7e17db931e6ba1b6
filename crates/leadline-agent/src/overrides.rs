// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-local operator overrides.
//!
//! Flags live only as long as the process. Deployments that need them to
//! survive a restart supply their own [`OverrideStore`].

use async_trait::async_trait;
use dashmap::DashSet;
use leadline_core::{AdapterType, HealthStatus, LeadId, LeadlineError, OverrideStore, PluginAdapter};
use tracing::info;

#[derive(Debug, Default)]
pub struct InMemoryOverrides {
    dev_mode: DashSet<LeadId>,
    paused: DashSet<LeadId>,
}

impl InMemoryOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dev mode keeps the assistant replying but never escalates the lead.
    pub fn set_dev_mode(&self, lead_id: &LeadId, enabled: bool) {
        toggle(&self.dev_mode, lead_id, enabled);
        info!(lead_id = %lead_id, enabled, "dev mode override changed");
    }

    /// A paused lead gets no automated replies until resumed.
    pub fn set_paused(&self, lead_id: &LeadId, paused: bool) {
        toggle(&self.paused, lead_id, paused);
        info!(lead_id = %lead_id, paused, "pause override changed");
    }
}

fn toggle(set: &DashSet<LeadId>, lead_id: &LeadId, on: bool) {
    if on {
        set.insert(lead_id.clone());
    } else {
        set.remove(lead_id);
    }
}

#[async_trait]
impl PluginAdapter for InMemoryOverrides {
    fn name(&self) -> &str {
        "in-memory-overrides"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Overrides
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadlineError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl OverrideStore for InMemoryOverrides {
    async fn is_dev_mode(&self, lead_id: &LeadId) -> Result<bool, LeadlineError> {
        Ok(self.dev_mode.contains(lead_id))
    }

    async fn is_paused(&self, lead_id: &LeadId) -> Result<bool, LeadlineError> {
        Ok(self.paused.contains(lead_id))
    }
}
