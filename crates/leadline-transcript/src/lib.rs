// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded SMS transcripts stored inside a CRM free-text field.
//!
//! - [`codec`]: marker-delimited JSON block, tolerant decoding.
//! - [`store`]: the per-lead [`TranscriptStore`] value and [`MessageDraft`].
//! - [`manager`]: count and byte limits, compression, utilization stats.
//!
//! Nothing here performs I/O. A caller runs decode → commit → encode and
//! writes the result back itself, holding a per-lead lock for the whole
//! cycle: the CRM field has no transactional update, so two unsynchronized
//! writers lose one of the appends.

pub mod codec;
pub mod manager;
pub mod store;

pub use codec::{
    END_MARKER, START_MARKER, decode, decode_field, encode, encode_block, encoded_len,
    strip_transcript,
};
pub use manager::{
    Committed, CompressionPolicy, PolicyReport, StorageManager, TranscriptStats,
};
pub use store::{MessageDraft, SCHEMA_VERSION, TranscriptStore};
