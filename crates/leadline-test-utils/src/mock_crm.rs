// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory CRM for deterministic tests.
//!
//! `MockCrm` stores lead records in a map, records every status update, and
//! can be told to fail reads or writes.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadline_core::traits::adapter::PluginAdapter;
use leadline_core::traits::crm::{CrmAdapter, LeadStatusUpdate};
use leadline_core::types::{AdapterType, HealthStatus, LeadId, LeadProfile, LeadRecord};
use leadline_core::LeadlineError;

pub struct MockCrm {
    records: Arc<Mutex<HashMap<LeadId, LeadRecord>>>,
    updates: Arc<Mutex<Vec<(LeadId, LeadStatusUpdate)>>>,
    writes: AtomicUsize,
    fail_get: AtomicBool,
    fail_writes: AtomicBool,
}

impl MockCrm {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            updates: Arc::new(Mutex::new(Vec::new())),
            writes: AtomicUsize::new(0),
            fail_get: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Adds a lead with an empty free-text field.
    pub async fn add_lead(&self, lead_id: &str, phone: &str, first_name: Option<&str>) -> LeadId {
        let id = LeadId::from(lead_id);
        let record = LeadRecord {
            lead_id: id.clone(),
            profile: LeadProfile {
                first_name: first_name.map(String::from),
                phone: phone.to_string(),
                ..LeadProfile::default()
            },
            free_text: None,
            escalated: false,
        };
        self.records.lock().await.insert(id.clone(), record);
        id
    }

    pub async fn record(&self, lead_id: &LeadId) -> Option<LeadRecord> {
        self.records.lock().await.get(lead_id).cloned()
    }

    pub async fn free_text(&self, lead_id: &LeadId) -> Option<String> {
        self.record(lead_id).await.and_then(|r| r.free_text)
    }

    pub async fn set_free_text(&self, lead_id: &LeadId, text: &str) {
        if let Some(record) = self.records.lock().await.get_mut(lead_id) {
            record.free_text = Some(text.to_string());
        }
    }

    /// Clears the escalation flag, as an agent would after follow-up.
    pub async fn clear_escalation(&self, lead_id: &LeadId) {
        if let Some(record) = self.records.lock().await.get_mut(lead_id) {
            record.escalated = false;
        }
    }

    pub async fn status_updates(&self) -> Vec<(LeadId, LeadStatusUpdate)> {
        self.updates.lock().await.clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes `get_lead` fail; `find_lead_by_phone` keeps working.
    pub fn fail_get_lead(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl Default for MockCrm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockCrm {
    fn name(&self) -> &str {
        "mock-crm"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Crm
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadlineError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl CrmAdapter for MockCrm {
    async fn find_lead_by_phone(&self, phone: &str) -> Result<Option<LeadRecord>, LeadlineError> {
        Ok(self
            .records
            .lock()
            .await
            .values()
            .find(|r| r.profile.phone == phone)
            .cloned())
    }

    async fn get_lead(&self, lead_id: &LeadId) -> Result<Option<LeadRecord>, LeadlineError> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(LeadlineError::crm("mock crm read failure"));
        }
        Ok(self.record(lead_id).await)
    }

    async fn write_free_text(&self, lead_id: &LeadId, text: &str) -> Result<(), LeadlineError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LeadlineError::crm("mock crm write failure"));
        }
        let mut records = self.records.lock().await;
        let record = records
            .get_mut(lead_id)
            .ok_or_else(|| LeadlineError::crm(format!("no lead {lead_id}")))?;
        record.free_text = Some(text.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_status(
        &self,
        lead_id: &LeadId,
        update: &LeadStatusUpdate,
    ) -> Result<(), LeadlineError> {
        if let Some(record) = self.records.lock().await.get_mut(lead_id) {
            record.escalated = update.escalated;
        }
        self.updates.lock().await.push((lead_id.clone(), update.clone()));
        Ok(())
    }
}
