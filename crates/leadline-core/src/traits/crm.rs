// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CRM adapter trait: lead lookup and wholesale free-text field access.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LeadlineError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{LeadId, LeadRecord};

/// Qualification fields pushed back to the CRM after every inbound event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadStatusUpdate {
    /// Signal names with keyword evidence, e.g. `timeline`.
    pub answered_signals: Vec<String>,
    pub complete: bool,
    pub escalated: bool,
    pub reasons: Vec<String>,
}

/// Adapter for the CRM holding lead records.
///
/// The free-text field has no partial update and no transactional primitive:
/// it is read and written whole. Callers serialize writers per lead.
#[async_trait]
pub trait CrmAdapter: PluginAdapter {
    /// Finds the lead owning a phone number, if any.
    async fn find_lead_by_phone(&self, phone: &str) -> Result<Option<LeadRecord>, LeadlineError>;

    /// Reads a lead by id.
    async fn get_lead(&self, lead_id: &LeadId) -> Result<Option<LeadRecord>, LeadlineError>;

    /// Replaces the lead's free-text field.
    async fn write_free_text(&self, lead_id: &LeadId, text: &str) -> Result<(), LeadlineError>;

    /// Records qualification progress and the escalation flag.
    async fn update_status(
        &self,
        lead_id: &LeadId,
        update: &LeadStatusUpdate,
    ) -> Result<(), LeadlineError>;
}
