// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transcript codec: embeds a [`TranscriptStore`] in a CRM free-text field.
//!
//! The field holds operator notes followed by one block:
//!
//! ```text
//! Met at the Elm St open house.
//!
//! [LEADLINE_TRANSCRIPT_START]{"version":1,"messages":[...],...}[LEADLINE_TRANSCRIPT_END]
//! ```
//!
//! The marker strings are part of the persisted format and must not change.
//! Schema changes go through the `version` field instead.

use chrono::{DateTime, Utc};
use leadline_core::{LeadlineError, TranscriptEntry};
use serde_json::Value;
use tracing::{debug, warn};

use crate::store::{SCHEMA_VERSION, TranscriptStore};

pub const START_MARKER: &str = "[LEADLINE_TRANSCRIPT_START]";
pub const END_MARKER: &str = "[LEADLINE_TRANSCRIPT_END]";

/// Prefix shared by both markers. Occurrences inside message content are
/// written with the bracket as a JSON `[` escape so they cannot be
/// mistaken for a real marker.
const MARKER_PREFIX: &str = "[LEADLINE_TRANSCRIPT_";
const ESCAPED_MARKER_PREFIX: &str = "\\u005bLEADLINE_TRANSCRIPT_";

/// Decodes the transcript held in a free-text field.
///
/// Never fails. An absent field, missing markers with non-JSON text, a
/// malformed payload, or a payload without a `messages` array all yield an
/// empty store. Individual entries that do not parse are dropped.
pub fn decode(raw: &str) -> TranscriptStore {
    let (payload, has_markers) = match extract_payload(raw) {
        Some(payload) => (payload, true),
        // Older records stored the bare JSON without markers.
        None => (raw.trim(), false),
    };

    if payload.is_empty() {
        return TranscriptStore::empty();
    }

    let value = match serde_json::from_str::<Value>(payload) {
        Ok(value) => value,
        Err(e) => {
            if has_markers || raw.contains(START_MARKER) {
                warn!(error = %e, "malformed transcript payload, starting from an empty transcript");
            } else {
                debug!("free-text field holds no transcript");
            }
            return TranscriptStore::empty();
        }
    };

    store_from_value(value).unwrap_or_else(|| {
        warn!("transcript payload has no messages array, starting from an empty transcript");
        TranscriptStore::empty()
    })
}

/// Decodes an optional field; `None` means the CRM field was never written.
pub fn decode_field(raw: Option<&str>) -> TranscriptStore {
    raw.map(decode).unwrap_or_default()
}

/// Serializes `store` into `free_text`, replacing any earlier transcript block.
///
/// Text outside the markers is preserved. The encoder does not enforce size
/// limits; run the storage manager first.
pub fn encode(store: &TranscriptStore, free_text: &str) -> Result<String, LeadlineError> {
    let block = encode_block(store)?;
    let notes = strip_transcript(free_text);
    if notes.is_empty() {
        Ok(block)
    } else {
        Ok(format!("{notes}\n\n{block}"))
    }
}

/// The marker-delimited block for `store`.
pub fn encode_block(store: &TranscriptStore) -> Result<String, LeadlineError> {
    let payload = payload(store)?;
    Ok(format!("{START_MARKER}{payload}{END_MARKER}"))
}

/// Byte length of the block [`encode_block`] would produce.
pub fn encoded_len(store: &TranscriptStore) -> usize {
    match payload(store) {
        Ok(payload) => START_MARKER.len() + payload.len() + END_MARKER.len(),
        // Unreachable for these types; an unmeasurable store counts as full.
        Err(_) => usize::MAX,
    }
}

/// Removes every transcript block from `free_text` and returns the notes
/// that remain, with trailing whitespace trimmed.
///
/// A start marker without a matching end marker is treated as a corrupt
/// block running to the end of the text.
pub fn strip_transcript(free_text: &str) -> String {
    let mut text = free_text.to_string();
    while let Some(start) = text.find(START_MARKER) {
        match text[start..].find(END_MARKER) {
            Some(rel_end) => {
                let end = start + rel_end + END_MARKER.len();
                text.replace_range(start..end, "");
            }
            None => {
                text.truncate(start);
                break;
            }
        }
    }
    let text = text.replace(END_MARKER, "");
    text.trim_end().to_string()
}

/// Locates the payload of the last complete block in `raw`.
fn extract_payload(raw: &str) -> Option<&str> {
    let start = raw.rfind(START_MARKER)? + START_MARKER.len();
    let len = raw[start..].find(END_MARKER)?;
    Some(raw[start..start + len].trim())
}

fn payload(store: &TranscriptStore) -> Result<String, LeadlineError> {
    let json = serde_json::to_string(store)?;
    Ok(json.replace(MARKER_PREFIX, ESCAPED_MARKER_PREFIX))
}

fn store_from_value(value: Value) -> Option<TranscriptStore> {
    let Value::Object(mut object) = value else {
        return None;
    };
    let Some(Value::Array(raw_messages)) = object.remove("messages") else {
        return None;
    };

    let total = raw_messages.len();
    let messages: Vec<TranscriptEntry> = raw_messages
        .into_iter()
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect();
    if messages.len() < total {
        warn!(
            dropped = total - messages.len(),
            kept = messages.len(),
            "dropped unreadable transcript entries"
        );
    }

    let version = object
        .get("version")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(SCHEMA_VERSION);
    let last_updated = object
        .get("lastUpdated")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| messages.last().map(TranscriptEntry::timestamp))
        .unwrap_or_else(Utc::now);
    let compressed = object
        .get("compressed")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let mut store = TranscriptStore {
        version,
        messages,
        last_updated,
        compressed,
        message_count: 0,
    };
    store.sync_count();
    Some(store)
}
