// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadline inspect` and `leadline qualify`.

use leadline_config::model::LeadlineConfig;
use leadline_context::ContextAssembler;
use leadline_core::{LeadlineError, TranscriptEntry};
use leadline_qualify::{QualificationEngine, QualificationStatus};
use leadline_transcript::{StorageManager, TranscriptStats, decode, strip_transcript};
use serde::Serialize;

use crate::blob::read_blob;

/// Structured output for `inspect --json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectReport {
    pub stats: TranscriptStats,
    pub notes: String,
    pub messages: Vec<TranscriptEntry>,
}

pub fn inspect(config: &LeadlineConfig, raw: &str) -> InspectReport {
    let store = decode(raw);
    InspectReport {
        stats: StorageManager::new(&config.storage).stats(&store),
        notes: strip_transcript(raw),
        messages: store.messages,
    }
}

pub fn qualify(config: &LeadlineConfig, raw: &str, bypass: bool) -> QualificationStatus {
    QualificationEngine::new(&config.qualification).analyze(&decode(raw).messages, bypass)
}

/// Human-readable summary followed by the conversation.
pub fn format_report(config: &LeadlineConfig, report: &InspectReport) -> String {
    let s = &report.stats;
    let mut out = format!(
        "messages:   {}\nsize:       {} / {} bytes ({:.1}%)\ncompressed: {}\n",
        s.count,
        s.bytes_used,
        s.ceiling,
        s.percent_used,
        if s.compressed { "yes" } else { "no" },
    );
    if !report.notes.is_empty() {
        out.push_str(&format!("notes:      {} chars\n", report.notes.chars().count()));
    }
    if !report.messages.is_empty() {
        let assembler = ContextAssembler::new(&config.agent);
        out.push('\n');
        out.push_str(&assembler.render_history(&report.messages, "Lead"));
        out.push('\n');
    }
    out
}

pub async fn run_inspect(config: &LeadlineConfig, input: &str, json: bool) -> Result<(), LeadlineError> {
    let raw = read_blob(input).await?;
    let report = inspect(config, &raw);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(config, &report));
    }
    Ok(())
}

pub async fn run_qualify(config: &LeadlineConfig, input: &str, bypass: bool) -> Result<(), LeadlineError> {
    let raw = read_blob(input).await?;
    let status = qualify(config, &raw, bypass);
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use leadline_core::MessageKind;
    use leadline_transcript::{MessageDraft, TranscriptStore, encode};

    use super::*;

    fn field(config: &LeadlineConfig) -> String {
        let m = StorageManager::new(&config.storage);
        let store = m.append(&TranscriptStore::empty(), MessageDraft::inbound("Call me please"));
        let store = m.append(&store, MessageDraft::outbound(MessageKind::AiGenerated, "Will do!"));
        encode(&store, "VIP lead").unwrap()
    }

    #[test]
    fn inspect_reports_stats_and_notes() {
        let config = LeadlineConfig::default();
        let report = inspect(&config, &field(&config));
        assert_eq!(report.stats.count, 2);
        assert_eq!(report.notes, "VIP lead");

        let text = format_report(&config, &report);
        assert!(text.contains("messages:   2"));
        assert!(text.contains("Lead: Call me please\nAlex: Will do!"));
    }

    #[test]
    fn inspect_handles_garbage() {
        let report = inspect(&LeadlineConfig::default(), "garbage{");
        assert_eq!(report.stats.count, 0);
        assert_eq!(report.notes, "garbage{");
    }

    #[test]
    fn qualify_honours_bypass() {
        let config = LeadlineConfig::default();
        assert!(qualify(&config, &field(&config), false).should_escalate);
        let bypassed = qualify(&config, &field(&config), true);
        assert!(!bypassed.should_escalate);
        assert!(bypassed.phone_interest);
    }
}
