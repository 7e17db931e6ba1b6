// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds the conversation context handed to reply generation.

use leadline_config::model::AgentConfig;
use leadline_core::{Direction, LeadId, LeadProfile, LeadRecord, LeadlineError, TranscriptEntry};
use leadline_transcript::decode_field;
use tracing::{debug, warn};

use crate::template::{PromptParams, PromptTemplate};

/// History and profile for one reply.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledContext {
    pub lead_id: LeadId,
    /// Oldest first.
    pub history: Vec<TranscriptEntry>,
    /// `None` when the CRM record could not be read.
    pub lead_profile: Option<LeadProfile>,
    /// True when `history` came from the caller-supplied copy.
    pub used_fallback: bool,
    pub current_message: String,
}

/// Combines a lead's stored transcript, profile and current message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextAssembler {
    assistant_name: String,
    brokerage: String,
    default_lead_name: String,
}

impl ContextAssembler {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            assistant_name: config.assistant_name.clone(),
            brokerage: config.brokerage.clone(),
            default_lead_name: config.default_lead_name.clone(),
        }
    }

    pub fn assistant_name(&self) -> &str {
        &self.assistant_name
    }

    /// Decodes the transcript from `primary`; when the record is unavailable
    /// or its transcript is empty, `fallback` is used instead.
    ///
    /// Never fails: a missing history must not block a reply.
    pub fn build_context(
        &self,
        lead_id: &LeadId,
        current_message: &str,
        primary: Result<&LeadRecord, &LeadlineError>,
        fallback: &[TranscriptEntry],
    ) -> AssembledContext {
        let (history, lead_profile, used_fallback) = match primary {
            Ok(record) => {
                let store = decode_field(record.free_text.as_deref());
                if store.is_empty() && !fallback.is_empty() {
                    warn!(
                        lead_id = %lead_id,
                        fallback_len = fallback.len(),
                        "stored transcript empty, using fallback history"
                    );
                    (fallback.to_vec(), Some(record.profile.clone()), true)
                } else {
                    (store.messages, Some(record.profile.clone()), false)
                }
            }
            Err(e) => {
                warn!(
                    lead_id = %lead_id,
                    error = %e,
                    fallback_len = fallback.len(),
                    "lead record unavailable, using fallback history"
                );
                (fallback.to_vec(), None, true)
            }
        };

        debug!(lead_id = %lead_id, history_len = history.len(), used_fallback, "context assembled");
        AssembledContext {
            lead_id: lead_id.clone(),
            history,
            lead_profile,
            used_fallback,
            current_message: current_message.to_string(),
        }
    }

    /// Name used for the lead in transcripts and prompts.
    pub fn lead_name(&self, profile: Option<&LeadProfile>) -> String {
        profile
            .and_then(LeadProfile::display_name)
            .unwrap_or_else(|| self.default_lead_name.clone())
    }

    /// One `"{speaker}: {content}"` line per entry, oldest first.
    pub fn render_history(&self, history: &[TranscriptEntry], lead_name: &str) -> String {
        history
            .iter()
            .map(|entry| {
                let speaker = match entry.direction() {
                    Direction::Inbound => lead_name,
                    Direction::Outbound => self.assistant_name.as_str(),
                };
                format!("{speaker}: {}", entry.content())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Renders the reply prompt for `context`.
    ///
    /// `missing_signals` are human-readable topics the assistant still needs
    /// to ask about.
    pub fn render_prompt(
        &self,
        template: &PromptTemplate,
        context: &AssembledContext,
        missing_signals: &[&str],
    ) -> String {
        let lead_name = self.lead_name(context.lead_profile.as_ref());
        let history = if context.history.is_empty() {
            "(no earlier messages)".to_string()
        } else {
            self.render_history(&context.history, &lead_name)
        };
        let missing = if missing_signals.is_empty() {
            "nothing, they are fully qualified".to_string()
        } else {
            missing_signals.join("; ")
        };

        template.render(&PromptParams {
            lead_name: &lead_name,
            assistant_name: &self.assistant_name,
            brokerage: &self.brokerage,
            history: &history,
            current_message: &context.current_message,
            missing_signals: &missing,
        })
    }
}
