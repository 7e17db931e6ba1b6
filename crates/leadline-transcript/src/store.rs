// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-lead transcript value and the append input type.

use chrono::{DateTime, Utc};
use leadline_core::{Direction, MessageId, MessageKind, TranscriptEntry};
use serde::{Deserialize, Serialize};

/// Schema tag written into every payload.
pub const SCHEMA_VERSION: u32 = 1;

/// The bounded message log owned by one lead.
///
/// Values are never shared between leads and never mutated in place by the
/// storage manager: every operation returns a new store, and the caller's
/// copy stays valid until it commits the replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptStore {
    pub version: u32,
    /// Oldest first.
    pub messages: Vec<TranscriptEntry>,
    pub last_updated: DateTime<Utc>,
    /// True once any compression or truncation pass has run.
    pub compressed: bool,
    pub message_count: usize,
}

impl TranscriptStore {
    /// A fresh store with no messages.
    pub fn empty() -> Self {
        Self {
            version: SCHEMA_VERSION,
            messages: Vec::new(),
            last_updated: Utc::now(),
            compressed: false,
            message_count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Number of messages sent by the lead.
    pub fn inbound_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_inbound()).count()
    }

    /// Timestamp of the newest entry, if any.
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.messages.last().map(TranscriptEntry::timestamp)
    }

    /// Whether a full entry already carries this provider correlation id.
    ///
    /// Compressed entries have dropped theirs, so a very old retry can slip
    /// through; callers de-duplicate before appending.
    pub fn contains_external_ref(&self, external_ref: &str) -> bool {
        self.messages
            .iter()
            .any(|m| m.external_ref() == Some(external_ref))
    }

    pub(crate) fn sync_count(&mut self) {
        self.message_count = self.messages.len();
    }
}

impl Default for TranscriptStore {
    fn default() -> Self {
        Self::empty()
    }
}

/// Input to an append. Missing ids and timestamps are filled in by the
/// storage manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub id: Option<MessageId>,
    pub direction: Direction,
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub external_ref: Option<String>,
}

impl MessageDraft {
    /// A message received from the lead.
    pub fn inbound(content: impl Into<String>) -> Self {
        Self {
            id: None,
            direction: Direction::Inbound,
            kind: MessageKind::Sms,
            content: content.into(),
            timestamp: None,
            external_ref: None,
        }
    }

    /// A message sent to the lead.
    pub fn outbound(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            id: None,
            direction: Direction::Outbound,
            kind,
            content: content.into(),
            timestamp: None,
            external_ref: None,
        }
    }

    pub fn with_id(mut self, id: MessageId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_external_ref(mut self, external_ref: impl Into<String>) -> Self {
        self.external_ref = Some(external_ref.into());
        self
    }
}
