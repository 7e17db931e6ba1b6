// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stored transcript to rendered prompt, through an operator template file.

use std::io::Write;

use leadline_config::model::{AgentConfig, PromptConfig, StorageConfig};
use leadline_context::{ContextAssembler, TemplateError, load_template_strict};
use leadline_core::{LeadId, LeadProfile, LeadRecord, LeadlineError, MessageKind};
use leadline_transcript::{MessageDraft, StorageManager, TranscriptStore, encode};

fn lead_record(free_text: Option<String>) -> LeadRecord {
    LeadRecord {
        lead_id: LeadId::from("lead-42"),
        profile: LeadProfile {
            first_name: Some("Dana".into()),
            last_name: Some("Reyes".into()),
            phone: "+15557654321".into(),
            email: None,
            source: Some("open house".into()),
        },
        free_text,
        escalated: false,
    }
}

fn stored_conversation() -> String {
    let manager = StorageManager::new(&StorageConfig::default());
    let drafts = [
        MessageDraft::inbound("Saw the listing on Birch Ave").with_external_ref("SM1"),
        MessageDraft::outbound(MessageKind::AiGenerated, "Great! Are you working with an agent?"),
        MessageDraft::inbound("No agent yet").with_external_ref("SM2"),
    ];
    let store = drafts
        .into_iter()
        .fold(TranscriptStore::empty(), |store, draft| manager.commit(&store, draft).store);
    encode(&store, "Prefers evenings").expect("encode")
}

fn agent() -> AgentConfig {
    AgentConfig {
        assistant_name: "Jordan".into(),
        brokerage: "Harbor Realty".into(),
        ..AgentConfig::default()
    }
}

#[tokio::test]
async fn file_template_renders_stored_history() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        "${{assistant_name}} @ ${{brokerage}} -> ${{lead_name}}\n${{history}}\nASK: ${{missing_signals}}\nNOW: ${{current_message}}"
    )
    .expect("write template");

    let template = load_template_strict(&PromptConfig {
        template: Some("ignored ${lead_name}".into()),
        template_file: Some(file.path().display().to_string()),
    })
    .await
    .expect("template file loads");

    let record = lead_record(Some(stored_conversation()));
    let assembler = ContextAssembler::new(&agent());
    let context = assembler.build_context(&record.lead_id, "Is it still open Sunday?", Ok(&record), &[]);
    assert!(!context.used_fallback);
    assert_eq!(context.history.len(), 3);

    let prompt = assembler.render_prompt(&template, &context, &["when they plan to move"]);
    assert_eq!(
        prompt,
        "Jordan @ Harbor Realty -> Dana\n\
         Dana: Saw the listing on Birch Ave\n\
         Jordan: Great! Are you working with an agent?\n\
         Dana: No agent yet\n\
         ASK: when they plan to move\n\
         NOW: Is it still open Sunday?"
    );
}

#[tokio::test]
async fn unreachable_crm_uses_client_history_and_default_name() {
    let fallback_store = StorageManager::new(&StorageConfig::default())
        .append(&TranscriptStore::empty(), MessageDraft::inbound("hello again"));
    let err = LeadlineError::crm("timed out");

    let assembler = ContextAssembler::new(&agent());
    let context = assembler.build_context(
        &LeadId::from("lead-42"),
        "any update?",
        Err(&err),
        &fallback_store.messages,
    );
    assert!(context.used_fallback);
    assert!(context.lead_profile.is_none());

    let template = load_template_strict(&PromptConfig::default())
        .await
        .expect("builtin template");
    let prompt = assembler.render_prompt(&template, &context, &[]);
    assert!(prompt.contains("there: hello again"), "got: {prompt}");
    assert!(prompt.contains("nothing, they are fully qualified"));
}

#[tokio::test]
async fn template_file_with_typo_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "Hi ${{lead_nmae}}").expect("write template");

    let err = load_template_strict(&PromptConfig {
        template: None,
        template_file: Some(file.path().display().to_string()),
    })
    .await
    .expect_err("unknown placeholder");
    match err {
        TemplateError::UnknownPlaceholder { name, suggestion, .. } => {
            assert_eq!(name, "lead_nmae");
            assert_eq!(suggestion.as_deref(), Some("lead_name"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
