// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Drives one inbound SMS through the full pipeline.
//!
//! lookup → lock → re-read → decode → dedup → append inbound → gate on
//! lifecycle state → assemble context → reply → send → append outbound →
//! qualify → persist transcript → push status.
//!
//! All transcript work happens on owned values; the CRM sees exactly one
//! free-text write per event, made while the lead's lock is held.

use std::sync::Arc;

use leadline_config::model::LeadlineConfig;
use leadline_context::{ContextAssembler, PromptTemplate};
use leadline_core::{
    ConversationState, CrmAdapter, LeadId, LeadRecord, LeadStatusUpdate, LeadlineError,
    MessageKind, OverrideStore, ReplyProvider, SmsAdapter, TranscriptEntry,
};
use leadline_qualify::{QualificationEngine, QualificationStatus};
use leadline_transcript::{
    Committed, MessageDraft, PolicyReport, StorageManager, TranscriptStats, TranscriptStore,
    decode_field, encode,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::locks::LeadLocks;

/// An SMS received from a lead.
#[derive(Debug, Clone, Default)]
pub struct InboundSms {
    /// Sender phone number.
    pub from: String,
    pub body: String,
    /// The SMS provider's message id, used for de-duplication.
    pub provider_id: Option<String>,
    /// Client-held history used when the CRM copy is empty or unreadable.
    pub fallback_history: Vec<TranscriptEntry>,
}

/// Result of a successfully handled inbound message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundOutcome {
    pub lead_id: LeadId,
    /// State after this event.
    pub state: ConversationState,
    pub reply: String,
    /// Delivery id returned by the SMS transport.
    pub reply_ref: String,
    pub qualification: QualificationStatus,
    pub stats: TranscriptStats,
    pub report: PolicyReport,
    pub used_fallback: bool,
    /// False when the lead could not be re-read under its lock, in which
    /// case neither the transcript nor the status was written.
    pub persisted: bool,
}

/// What happened to an inbound message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum InboundResult {
    /// A reply was generated and sent.
    Replied(InboundOutcome),
    /// The provider id was already in the transcript. Nothing was written.
    Duplicate { lead_id: LeadId },
    /// The message was recorded but the lead is not accepting automated
    /// replies.
    Suppressed {
        lead_id: LeadId,
        state: ConversationState,
        stats: TranscriptStats,
    },
    /// No CRM lead owns the sender's number.
    UnknownLead { phone: String },
}

/// Result of an operator-initiated message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundOutcome {
    pub lead_id: LeadId,
    pub delivery_ref: String,
    pub stats: TranscriptStats,
    pub report: PolicyReport,
}

/// External collaborators the pipeline talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub crm: Arc<dyn CrmAdapter + Send + Sync>,
    pub sms: Arc<dyn SmsAdapter + Send + Sync>,
    pub provider: Arc<dyn ReplyProvider + Send + Sync>,
    pub overrides: Arc<dyn OverrideStore + Send + Sync>,
}

/// Stateless apart from the lock registry; share one per process.
pub struct ConversationHandler {
    collaborators: Collaborators,
    storage: StorageManager,
    qualifier: QualificationEngine,
    assembler: ContextAssembler,
    template: PromptTemplate,
    locks: LeadLocks,
}

impl ConversationHandler {
    pub fn new(
        config: &LeadlineConfig,
        template: PromptTemplate,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            collaborators,
            storage: StorageManager::new(&config.storage),
            qualifier: QualificationEngine::new(&config.qualification),
            assembler: ContextAssembler::new(&config.agent),
            template,
            locks: LeadLocks::new(),
        }
    }

    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }

    pub fn locks(&self) -> &LeadLocks {
        &self.locks
    }

    /// Handles one inbound SMS end to end.
    ///
    /// CRM, SMS and reply-provider failures propagate. When reply generation
    /// or delivery fails, the inbound message is still persisted first. A
    /// failed re-read of the lead still gets a reply, built from
    /// `fallback_history`, but nothing is written to the CRM.
    pub async fn handle_inbound(&self, sms: InboundSms) -> Result<InboundResult, LeadlineError> {
        let Collaborators {
            crm,
            sms: transport,
            provider,
            overrides,
        } = &self.collaborators;

        let Some(found) = crm.find_lead_by_phone(&sms.from).await? else {
            info!("inbound sms from unknown number");
            return Ok(InboundResult::UnknownLead { phone: sms.from });
        };
        let lead_id = found.lead_id.clone();
        let _guard = self.locks.acquire(&lead_id).await;

        // The lookup predates the lock. Only a record read under the lock
        // may be written back; otherwise the reply is built from the
        // caller's history and nothing is persisted.
        let (record, read_error) = match crm.get_lead(&lead_id).await {
            Ok(Some(record)) => (record, None),
            Ok(None) => {
                info!(lead_id = %lead_id, "lead removed before its message was handled");
                return Ok(InboundResult::UnknownLead { phone: sms.from });
            }
            Err(e) => {
                warn!(
                    lead_id = %lead_id,
                    error = %e,
                    "re-read failed, replying without updating the transcript"
                );
                (found, Some(e))
            }
        };
        let writable = read_error.is_none();
        let store = if writable {
            decode_field(record.free_text.as_deref())
        } else {
            working_copy(&sms.fallback_history)
        };

        if let Some(ref provider_id) = sms.provider_id {
            if store.contains_external_ref(provider_id) {
                info!(lead_id = %lead_id, "duplicate inbound sms ignored");
                return Ok(InboundResult::Duplicate { lead_id });
            }
        }

        let paused = overrides.is_paused(&lead_id).await?;
        let dev_mode = overrides.is_dev_mode(&lead_id).await?;
        let state = ConversationState::resolve(!store.is_empty(), record.escalated, paused);

        let mut inbound = MessageDraft::inbound(sms.body.clone());
        if let Some(ref provider_id) = sms.provider_id {
            inbound = inbound.with_external_ref(provider_id.clone());
        }
        let Committed { store, mut report } = self.storage.commit(&store, inbound);

        if !state.accepts_automated_replies() {
            self.write_back(&record, &store, writable).await?;
            info!(lead_id = %lead_id, state = %state, "automated reply suppressed");
            return Ok(InboundResult::Suppressed {
                stats: self.storage.stats(&store),
                lead_id,
                state,
            });
        }

        let primary = match read_error {
            Some(ref e) => Err(e),
            None => Ok(&record),
        };
        let context =
            self.assembler
                .build_context(&lead_id, &sms.body, primary, &sms.fallback_history);

        let before_reply = self.qualifier.analyze(&store.messages, dev_mode);
        let missing: Vec<&str> = before_reply
            .missing_signals()
            .into_iter()
            .map(|s| s.topic())
            .collect();
        let prompt = self.assembler.render_prompt(&self.template, &context, &missing);

        let reply = match provider.generate(&prompt).await {
            Ok(reply) => reply.trim().to_string(),
            Err(e) => {
                self.write_back(&record, &store, writable).await?;
                return Err(e);
            }
        };
        if reply.is_empty() {
            self.write_back(&record, &store, writable).await?;
            return Err(LeadlineError::provider("empty reply"));
        }

        let reply_ref = match transport.send(&record.profile.phone, &reply).await {
            Ok(reply_ref) => reply_ref,
            Err(e) => {
                self.write_back(&record, &store, writable).await?;
                return Err(e);
            }
        };

        let outbound = MessageDraft::outbound(MessageKind::AiGenerated, reply.clone())
            .with_external_ref(reply_ref.clone());
        let committed = self.storage.commit(&store, outbound);
        report.merge(&committed.report);
        let store = committed.store;

        let qualification = self
            .qualifier
            .analyze_with_reply(&store.messages, &reply, dev_mode);
        let persisted = self.write_back(&record, &store, writable).await?;

        let escalated = record.escalated || qualification.should_escalate;
        if persisted {
            crm.update_status(&lead_id, &status_update(&qualification, escalated))
                .await?;
        } else {
            warn!(lead_id = %lead_id, "transcript and status left unchanged");
        }

        if qualification.should_escalate && !record.escalated {
            info!(
                lead_id = %lead_id,
                reasons = qualification.reasons.len(),
                "lead escalated to a human agent"
            );
        } else if qualification.escalation_bypassed {
            info!(lead_id = %lead_id, "escalation bypassed by dev mode");
        }
        if report.is_lossy() {
            debug!(
                lead_id = %lead_id,
                evicted = report.evicted_by_count,
                compressed = report.compressed_entries,
                dropped = report.hard_truncated,
                "transcript storage policy applied"
            );
        }

        Ok(InboundResult::Replied(InboundOutcome {
            state: ConversationState::resolve(true, escalated, paused),
            stats: self.storage.stats(&store),
            lead_id,
            reply,
            reply_ref,
            qualification,
            report,
            used_fallback: context.used_fallback,
            persisted,
        }))
    }

    /// Sends an operator-written message and records it in the transcript.
    pub async fn send_outbound(
        &self,
        lead_id: &LeadId,
        text: &str,
    ) -> Result<OutboundOutcome, LeadlineError> {
        let _guard = self.locks.acquire(lead_id).await;
        let record = self.require_lead(lead_id).await?;
        let store = decode_field(record.free_text.as_deref());

        let delivery_ref = self
            .collaborators
            .sms
            .send(&record.profile.phone, text)
            .await?;
        let draft =
            MessageDraft::outbound(MessageKind::Sms, text).with_external_ref(delivery_ref.clone());
        let Committed { store, report } = self.storage.commit(&store, draft);
        self.persist(&record, &store).await?;

        info!(lead_id = %lead_id, "operator message sent");
        Ok(OutboundOutcome {
            lead_id: lead_id.clone(),
            delivery_ref,
            stats: self.storage.stats(&store),
            report,
        })
    }

    /// Replaces the lead's transcript with an empty one, keeping notes.
    pub async fn reset_transcript(&self, lead_id: &LeadId) -> Result<TranscriptStats, LeadlineError> {
        let _guard = self.locks.acquire(lead_id).await;
        let record = self.require_lead(lead_id).await?;
        let store = self.storage.reset();
        self.persist(&record, &store).await?;
        info!(lead_id = %lead_id, "transcript reset");
        Ok(self.storage.stats(&store))
    }

    /// Current utilization of a lead's stored transcript.
    pub async fn transcript_stats(&self, lead_id: &LeadId) -> Result<TranscriptStats, LeadlineError> {
        let record = self.require_lead(lead_id).await?;
        Ok(self.storage.stats(&decode_field(record.free_text.as_deref())))
    }

    async fn require_lead(&self, lead_id: &LeadId) -> Result<LeadRecord, LeadlineError> {
        self.collaborators
            .crm
            .get_lead(lead_id)
            .await?
            .ok_or_else(|| LeadlineError::LeadNotFound {
                lead_id: lead_id.clone(),
            })
    }

    async fn write_back(
        &self,
        record: &LeadRecord,
        store: &TranscriptStore,
        writable: bool,
    ) -> Result<bool, LeadlineError> {
        if !writable {
            return Ok(false);
        }
        self.persist(record, store).await?;
        Ok(true)
    }

    async fn persist(&self, record: &LeadRecord, store: &TranscriptStore) -> Result<(), LeadlineError> {
        let text = encode(store, record.free_text.as_deref().unwrap_or_default())?;
        self.collaborators
            .crm
            .write_free_text(&record.lead_id, &text)
            .await
    }
}

/// Transcript rebuilt from client-held history when the CRM copy is unreadable.
fn working_copy(history: &[TranscriptEntry]) -> TranscriptStore {
    TranscriptStore {
        messages: history.to_vec(),
        message_count: history.len(),
        ..TranscriptStore::empty()
    }
}

fn status_update(status: &QualificationStatus, escalated: bool) -> LeadStatusUpdate {
    LeadStatusUpdate {
        answered_signals: status.answered().iter().map(ToString::to_string).collect(),
        complete: status.complete,
        escalated,
        reasons: status.reasons.clone(),
    }
}
