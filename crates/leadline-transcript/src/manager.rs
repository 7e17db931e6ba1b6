// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage manager: keeps a transcript inside its count and byte bounds.
//!
//! Count is enforced on append by evicting the oldest entries. Size is
//! enforced in two stages: above the compression threshold every entry but
//! the most recent few is compressed; if the block still exceeds the hard
//! ceiling the oldest entries are dropped until it fits. A lone entry that is
//! too large by itself has its content cut.
//!
//! The manager does not de-duplicate. Appending the same provider message
//! twice stores it twice; callers check `external_ref` first.

use chrono::Utc;
use leadline_config::model::StorageConfig;
use leadline_core::{Message, MessageId, TranscriptEntry};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::codec::encoded_len;
use crate::store::{MessageDraft, TranscriptStore};

/// Compression strategy. Disabling it leaves hard truncation as the only
/// guard on the ceiling.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionPolicy {
    pub enabled: bool,
    /// Fraction of the ceiling above which a compression pass runs.
    pub threshold: f64,
    /// Most recent entries left at full fidelity.
    pub recent_full: usize,
    /// Maximum characters kept in a compressed entry.
    pub compressed_length: usize,
}

/// What the size policy did during one commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PolicyReport {
    /// Entries dropped because the count limit was exceeded.
    pub evicted_by_count: usize,
    /// Entries newly converted to compressed form.
    pub compressed_entries: usize,
    /// Entries dropped to get under the byte ceiling.
    pub hard_truncated: usize,
    /// Whether a single entry's content had to be cut to fit.
    pub oversized_truncated: bool,
}

impl PolicyReport {
    /// True if any message content or entry was lost.
    pub fn is_lossy(&self) -> bool {
        self.evicted_by_count > 0
            || self.compressed_entries > 0
            || self.hard_truncated > 0
            || self.oversized_truncated
    }

    /// Folds the actions of a later commit into this report.
    pub fn merge(&mut self, other: &PolicyReport) {
        self.evicted_by_count += other.evicted_by_count;
        self.compressed_entries += other.compressed_entries;
        self.hard_truncated += other.hard_truncated;
        self.oversized_truncated |= other.oversized_truncated;
    }
}

/// Result of [`StorageManager::commit`].
#[derive(Debug, Clone, PartialEq)]
pub struct Committed {
    pub store: TranscriptStore,
    pub report: PolicyReport,
}

/// Utilization snapshot for operators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptStats {
    pub count: usize,
    pub bytes_used: usize,
    pub ceiling: usize,
    pub percent_used: f64,
    pub compressed: bool,
}

/// Applies count and size limits to transcripts.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageManager {
    max_messages: usize,
    ceiling_bytes: usize,
    compression: CompressionPolicy,
}

impl StorageManager {
    /// Creates a manager from storage configuration.
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            max_messages: config.max_messages.max(1),
            ceiling_bytes: config.ceiling_bytes,
            compression: CompressionPolicy {
                enabled: config.compression.enabled,
                threshold: config.compression.threshold,
                recent_full: config.compression.recent_full(),
                compressed_length: config.compression.compressed_length,
            },
        }
    }

    pub fn ceiling_bytes(&self) -> usize {
        self.ceiling_bytes
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    pub fn compression(&self) -> &CompressionPolicy {
        &self.compression
    }

    /// Appends a message, evicting the oldest entries past the count limit.
    ///
    /// Fills in a generated id and the current time when the draft has none,
    /// and clamps the timestamp so storage order stays non-decreasing.
    pub fn append(&self, store: &TranscriptStore, draft: MessageDraft) -> TranscriptStore {
        let mut next = store.clone();
        self.append_in_place(&mut next, draft, &mut PolicyReport::default());
        next
    }

    /// Applies the compress-then-truncate size policy.
    pub fn enforce_size_limit(&self, store: &TranscriptStore) -> TranscriptStore {
        let mut next = store.clone();
        self.enforce_in_place(&mut next, &mut PolicyReport::default());
        next
    }

    /// Append followed by size enforcement, ready to encode.
    pub fn commit(&self, store: &TranscriptStore, draft: MessageDraft) -> Committed {
        let mut next = store.clone();
        let mut report = PolicyReport::default();
        self.append_in_place(&mut next, draft, &mut report);
        self.enforce_in_place(&mut next, &mut report);
        Committed {
            store: next,
            report,
        }
    }

    /// An empty transcript, used by cleanup tooling to wipe a lead's history.
    pub fn reset(&self) -> TranscriptStore {
        TranscriptStore::empty()
    }

    /// Utilization of `store` against this manager's ceiling.
    pub fn stats(&self, store: &TranscriptStore) -> TranscriptStats {
        let bytes_used = encoded_len(store);
        let percent_used = if self.ceiling_bytes == 0 {
            100.0
        } else {
            let raw = bytes_used as f64 * 100.0 / self.ceiling_bytes as f64;
            (raw * 10.0).round() / 10.0
        };
        TranscriptStats {
            count: store.len(),
            bytes_used,
            ceiling: self.ceiling_bytes,
            percent_used,
            compressed: store.compressed,
        }
    }

    fn append_in_place(
        &self,
        store: &mut TranscriptStore,
        draft: MessageDraft,
        report: &mut PolicyReport,
    ) {
        let now = Utc::now();
        let mut timestamp = draft.timestamp.unwrap_or(now);
        if let Some(last) = store.last_timestamp() {
            if timestamp < last {
                debug!(%timestamp, %last, "clamping out-of-order timestamp");
                timestamp = last;
            }
        }

        store.messages.push(TranscriptEntry::Full(Message {
            id: draft.id.unwrap_or_else(MessageId::generate),
            direction: draft.direction,
            kind: draft.kind,
            content: draft.content,
            timestamp,
            external_ref: draft.external_ref,
            truncated: false,
        }));

        if store.messages.len() > self.max_messages {
            let excess = store.messages.len() - self.max_messages;
            store.messages.drain(..excess);
            report.evicted_by_count += excess;
            debug!(evicted = excess, max = self.max_messages, "evicted oldest messages");
        }

        store.last_updated = now.max(timestamp);
        store.sync_count();
    }

    fn enforce_in_place(&self, store: &mut TranscriptStore, report: &mut PolicyReport) {
        let before = encoded_len(store);

        if self.compression.enabled && before as f64 > self.compression_trigger() {
            let boundary = store.len().saturating_sub(self.compression.recent_full);
            let mut newly = 0;
            for entry in &mut store.messages[..boundary] {
                if !entry.is_compressed() {
                    *entry = entry.compress(self.compression.compressed_length);
                    newly += 1;
                }
            }
            store.compressed = true;
            report.compressed_entries += newly;
            info!(
                bytes_before = before,
                bytes_after = encoded_len(store),
                compressed_entries = newly,
                kept_full = store.len() - boundary,
                "compressed older transcript entries"
            );
        }

        if encoded_len(store) > self.ceiling_bytes {
            let dropped = self.drop_oldest_until_fits(store);
            if dropped > 0 {
                store.compressed = true;
                report.hard_truncated += dropped;
                warn!(
                    dropped,
                    remaining = store.len(),
                    ceiling = self.ceiling_bytes,
                    "transcript over ceiling after compression, dropped oldest entries"
                );
            }
        }

        if encoded_len(store) > self.ceiling_bytes && store.len() == 1 {
            self.cut_single_entry(store);
            store.compressed = true;
            report.oversized_truncated = true;
        }

        store.sync_count();
    }

    fn compression_trigger(&self) -> f64 {
        self.ceiling_bytes as f64 * self.compression.threshold
    }

    /// Drops the fewest oldest entries that bring the block under the
    /// ceiling, always keeping the newest one. Size shrinks monotonically as
    /// entries are dropped, so the cut point is found by bisection.
    fn drop_oldest_until_fits(&self, store: &mut TranscriptStore) -> usize {
        let max_drop = store.len().saturating_sub(1);
        let fits_after = |drop: usize| {
            let mut probe = store.clone();
            probe.messages.drain(..drop);
            probe.sync_count();
            encoded_len(&probe) <= self.ceiling_bytes
        };

        let (mut lo, mut hi) = (0, max_drop);
        if !fits_after(hi) {
            lo = hi;
        } else {
            while lo < hi {
                let mid = lo + (hi - lo) / 2;
                if fits_after(mid) {
                    hi = mid;
                } else {
                    lo = mid + 1;
                }
            }
        }

        store.messages.drain(..lo);
        store.sync_count();
        lo
    }

    /// Cuts the content of the only remaining entry so the block fits.
    fn cut_single_entry(&self, store: &mut TranscriptStore) {
        let source = store.messages[0].content().to_string();
        let original_bytes = source.len();
        set_content(&mut store.messages[0], String::new());
        let overhead = encoded_len(store);
        let Some(mut budget) = self.ceiling_bytes.checked_sub(overhead) else {
            warn!(overhead, ceiling = self.ceiling_bytes, "ceiling too small for an empty entry");
            return;
        };

        // Escaping can make the serialized content longer than its byte
        // length, so shrink until the measured block fits.
        loop {
            let cut = prefix_at_boundary(&source, budget);
            set_content(&mut store.messages[0], cut.to_string());
            let size = encoded_len(store);
            if size <= self.ceiling_bytes || budget == 0 {
                break;
            }
            budget = budget.saturating_sub((size - self.ceiling_bytes).max(1));
        }

        info!(
            original_bytes,
            kept_bytes = store.messages[0].content().len(),
            ceiling = self.ceiling_bytes,
            "cut oversized message to fit the transcript ceiling"
        );
    }
}

fn set_content(entry: &mut TranscriptEntry, content: String) {
    match entry {
        TranscriptEntry::Full(m) => {
            m.content = content;
            m.truncated = true;
        }
        TranscriptEntry::Compressed(m) => m.content = content,
    }
}

fn prefix_at_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
