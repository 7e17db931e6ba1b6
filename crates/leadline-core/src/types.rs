// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the transcript, qualification, context and agent crates.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier of a lead record in the external CRM.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub String);

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LeadId {
    fn from(value: &str) -> Self {
        LeadId(value.to_string())
    }
}

/// Unique identifier for a transcript message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        MessageId(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who sent a message, relative to the lead.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    /// Sent by the lead.
    Inbound,
    /// Sent to the lead, by the assistant or an operator.
    Outbound,
}

/// Provenance of a message. This is not the delivery channel: every message
/// travels over SMS, `AiGenerated` marks text drafted by the reply model.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MessageKind {
    Sms,
    AiGenerated,
}

/// One full-fidelity transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub direction: Direction,
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Correlation id from the SMS provider, used by callers for de-duplication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,
    /// Set when the content was cut to fit the storage ceiling on its own.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
}

/// A reduced-fidelity entry produced by compression.
///
/// Keeps the identity fields, drops `kind` and `external_ref`, and carries
/// the original content length so readers can tell how much was cut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressedMessage {
    pub id: MessageId,
    pub direction: Direction,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Length of the original content, in characters.
    pub original_length: usize,
}

impl CompressedMessage {
    /// Compresses a full message, keeping at most `max_chars` characters of content.
    pub fn from_message(message: &Message, max_chars: usize) -> Self {
        Self {
            id: message.id.clone(),
            direction: message.direction,
            content: shorten(&message.content, max_chars),
            timestamp: message.timestamp,
            original_length: message.content.chars().count(),
        }
    }
}

/// Cuts `text` to at most `max_chars` characters, ending in `...` when cut.
pub fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars < 4 {
        return text.chars().take(max_chars).collect();
    }
    let mut out: String = text.chars().take(max_chars - 3).collect();
    out.push_str("...");
    out
}

/// A transcript slot: either a full message or its compressed form.
///
/// Serialized untagged; a compressed entry is recognized by the absence of
/// `kind` and the presence of `originalLength`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranscriptEntry {
    Full(Message),
    Compressed(CompressedMessage),
}

impl TranscriptEntry {
    pub fn id(&self) -> &MessageId {
        match self {
            TranscriptEntry::Full(m) => &m.id,
            TranscriptEntry::Compressed(m) => &m.id,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            TranscriptEntry::Full(m) => m.direction,
            TranscriptEntry::Compressed(m) => m.direction,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            TranscriptEntry::Full(m) => &m.content,
            TranscriptEntry::Compressed(m) => &m.content,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TranscriptEntry::Full(m) => m.timestamp,
            TranscriptEntry::Compressed(m) => m.timestamp,
        }
    }

    /// Compressed entries have dropped their correlation id.
    pub fn external_ref(&self) -> Option<&str> {
        match self {
            TranscriptEntry::Full(m) => m.external_ref.as_deref(),
            TranscriptEntry::Compressed(_) => None,
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, TranscriptEntry::Compressed(_))
    }

    pub fn is_inbound(&self) -> bool {
        self.direction() == Direction::Inbound
    }

    /// Returns the compressed form of this entry. Already-compressed entries
    /// are returned unchanged.
    pub fn compress(&self, max_chars: usize) -> TranscriptEntry {
        match self {
            TranscriptEntry::Full(m) => {
                TranscriptEntry::Compressed(CompressedMessage::from_message(m, max_chars))
            }
            TranscriptEntry::Compressed(_) => self.clone(),
        }
    }
}

impl From<Message> for TranscriptEntry {
    fn from(message: Message) -> Self {
        TranscriptEntry::Full(message)
    }
}

/// Lead profile fields read from the CRM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    /// Where the lead came from (portal, open house, referral...).
    pub source: Option<String>,
}

impl LeadProfile {
    /// The name used when addressing or quoting the lead, if the CRM has one.
    pub fn display_name(&self) -> Option<String> {
        let first = self.first_name.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let last = self.last_name.as_deref().map(str::trim).filter(|s| !s.is_empty());
        match (first, last) {
            (Some(f), _) => Some(f.to_string()),
            (None, Some(l)) => Some(l.to_string()),
            (None, None) => None,
        }
    }
}

/// A lead as read wholesale from the CRM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadRecord {
    pub lead_id: LeadId,
    pub profile: LeadProfile,
    /// The free-text field holding operator notes and the encoded transcript.
    pub free_text: Option<String>,
    /// Whether a previous event already handed this lead to a human agent.
    pub escalated: bool,
}

/// Conversation lifecycle as seen by the automation.
///
/// `Escalated` and `ManuallyPaused` suspend automated replies until an
/// operator or agent resets the lead; nothing in Leadline resumes on its own.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConversationState {
    /// No transcript yet.
    New,
    /// Messages flowing, automation replying.
    Active,
    /// Handed to a human agent.
    Escalated,
    /// Paused by an operator, independent of escalation.
    ManuallyPaused,
}

impl ConversationState {
    /// Derives the state from what the caller knows about a lead.
    /// An operator pause wins over escalation.
    pub fn resolve(has_transcript: bool, escalated: bool, paused: bool) -> Self {
        if paused {
            ConversationState::ManuallyPaused
        } else if escalated {
            ConversationState::Escalated
        } else if has_transcript {
            ConversationState::Active
        } else {
            ConversationState::New
        }
    }

    /// Whether the automation may send a reply in this state.
    pub fn accepts_automated_replies(self) -> bool {
        matches!(self, ConversationState::New | ConversationState::Active)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the collaborator an adapter stands in for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Crm,
    Sms,
    Reply,
    Overrides,
}
