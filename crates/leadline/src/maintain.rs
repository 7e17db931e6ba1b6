// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadline compact` and `leadline reset`: rewrite a field in place.

use leadline_config::model::LeadlineConfig;
use leadline_core::LeadlineError;
use leadline_transcript::{StorageManager, TranscriptStats, decode, encode};
use tracing::info;

use crate::blob::{read_blob, write_blob};

/// Result of compacting one field.
#[derive(Debug)]
pub struct Compacted {
    pub field: String,
    pub before: TranscriptStats,
    pub after: TranscriptStats,
}

/// Applies the size policy to an existing field without appending.
pub fn compact(config: &LeadlineConfig, raw: &str) -> Result<Compacted, LeadlineError> {
    let manager = StorageManager::new(&config.storage);
    let store = decode(raw);
    let before = manager.stats(&store);
    let enforced = manager.enforce_size_limit(&store);
    let after = manager.stats(&enforced);
    Ok(Compacted {
        field: encode(&enforced, raw)?,
        before,
        after,
    })
}

/// Empties the transcript, keeping operator notes.
pub fn reset(config: &LeadlineConfig, raw: &str) -> Result<String, LeadlineError> {
    let manager = StorageManager::new(&config.storage);
    encode(&manager.reset(), raw)
}

pub async fn run_compact(config: &LeadlineConfig, input: &str, write: bool) -> Result<(), LeadlineError> {
    let raw = read_blob(input).await?;
    let compacted = compact(config, &raw)?;
    info!(
        bytes_before = compacted.before.bytes_used,
        bytes_after = compacted.after.bytes_used,
        "transcript compacted"
    );
    eprintln!(
        "leadline: {} -> {} bytes ({} -> {} messages)",
        compacted.before.bytes_used,
        compacted.after.bytes_used,
        compacted.before.count,
        compacted.after.count,
    );
    emit(input, &compacted.field, write).await
}

pub async fn run_reset(config: &LeadlineConfig, input: &str, write: bool) -> Result<(), LeadlineError> {
    let raw = read_blob(input).await?;
    let field = reset(config, &raw)?;
    emit(input, &field, write).await
}

/// Writes back to the input with `--write`, otherwise prints to stdout.
async fn emit(input: &str, field: &str, write: bool) -> Result<(), LeadlineError> {
    if write {
        write_blob(input, field).await
    } else {
        println!("{field}");
        Ok(())
    }
}
