// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end pipeline tests over mock adapters.

use std::sync::Arc;

use fixtures::entry;
use leadline_agent::{InboundResult, InboundSms};
use leadline_core::{ConversationState, Direction, LeadId, LeadlineError, MessageKind};
use leadline_test_utils::TestHarness;
use leadline_transcript::{START_MARKER, decode_field};
use tracing_test::traced_test;

const PHONE: &str = "+15551234567";

async fn harness(responses: &[&str]) -> TestHarness {
    TestHarness::builder()
        .with_lead("lead-1", PHONE, Some("Ana"))
        .with_mock_responses(responses.iter().map(|r| r.to_string()).collect())
        .build()
        .await
        .expect("harness should build")
}

fn replied(result: InboundResult) -> leadline_agent::InboundOutcome {
    match result {
        InboundResult::Replied(outcome) => outcome,
        other => panic!("expected a reply, got {other:?}"),
    }
}

#[tokio::test]
async fn first_message_gets_a_reply_and_is_persisted() {
    let h = harness(&["Hi Ana! It is. When are you hoping to move?"]).await;
    let outcome = replied(h.send_sms(PHONE, "Is 12 Elm still available?").await.unwrap());

    assert_eq!(outcome.state, ConversationState::Active);
    assert_eq!(outcome.reply, "Hi Ana! It is. When are you hoping to move?");
    assert!(!outcome.used_fallback);
    assert_eq!(outcome.stats.count, 2);

    let sent = h.sms.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, PHONE);
    assert_eq!(sent[0].delivery_ref, outcome.reply_ref);

    let field = h.crm.free_text(&h.lead("lead-1")).await.unwrap();
    assert!(field.starts_with(START_MARKER));
    let store = decode_field(Some(&field));
    assert_eq!(store.len(), 2);
    assert_eq!(store.messages[0].direction(), Direction::Inbound);
    assert_eq!(store.messages[1].external_ref(), Some(outcome.reply_ref.as_str()));
    assert_eq!(h.crm.write_count(), 1);

    let updates = h.crm.status_updates().await;
    assert_eq!(updates.len(), 1);
    assert!(!updates[0].1.escalated);
}

#[tokio::test]
async fn prompt_carries_lead_name_history_and_missing_topics() {
    let h = harness(&["first", "second"]).await;
    h.send_sms(PHONE, "Hello there").await.unwrap();
    h.send_sms(PHONE, "We want to move next month").await.unwrap();

    let prompt = h.provider.last_prompt().await.unwrap();
    assert!(prompt.contains("Ana: Hello there"));
    assert!(prompt.contains("Alex: first"));
    assert!(prompt.contains("Ana: We want to move next month"));
    assert!(prompt.contains("whether they already work with an agent"));
    assert!(!prompt.contains("their timeline for buying or moving"));
}

#[tokio::test]
async fn unknown_number_is_reported() {
    let h = harness(&[]).await;
    let result = h.send_sms("+19998887777", "hello?").await.unwrap();
    assert_eq!(
        result,
        InboundResult::UnknownLead {
            phone: "+19998887777".into()
        }
    );
    assert_eq!(h.sms.sent_count().await, 0);
}

#[tokio::test]
#[traced_test]
async fn retried_webhook_is_ignored() {
    let h = harness(&[]).await;
    replied(h.send_sms_with_id(PHONE, "Hi", "SM-in-1").await.unwrap());
    let again = h.send_sms_with_id(PHONE, "Hi", "SM-in-1").await.unwrap();

    assert!(matches!(again, InboundResult::Duplicate { .. }));
    assert_eq!(h.sms.sent_count().await, 1);
    assert_eq!(h.crm.write_count(), 1);
    assert!(logs_contain("duplicate inbound sms ignored"));
}

#[tokio::test]
#[traced_test]
async fn phone_request_escalates_and_suspends_replies() {
    let h = harness(&["Sure, an agent will reach out shortly."]).await;
    let outcome = replied(h.send_sms(PHONE, "call me please").await.unwrap());

    assert_eq!(outcome.state, ConversationState::Escalated);
    assert!(outcome.qualification.phone_interest);
    assert!(outcome.qualification.should_escalate);
    let record = h.crm.record(&h.lead("lead-1")).await.unwrap();
    assert!(record.escalated);

    let next = h.send_sms(PHONE, "hello? anyone there").await.unwrap();
    match next {
        InboundResult::Suppressed { state, stats, .. } => {
            assert_eq!(state, ConversationState::Escalated);
            assert_eq!(stats.count, 3);
        }
        other => panic!("expected suppression, got {other:?}"),
    }
    assert_eq!(h.sms.sent_count().await, 1);
    assert!(logs_contain("lead escalated to a human agent"));
    assert!(logs_contain("automated reply suppressed"));
}

#[tokio::test]
async fn cleared_escalation_resumes_replies() {
    let h = harness(&[]).await;
    h.send_sms(PHONE, "call me please").await.unwrap();
    h.crm.clear_escalation(&h.lead("lead-1")).await;
    let outcome = replied(h.send_sms(PHONE, "thanks").await.unwrap());
    // The earlier phone request is still in the transcript.
    assert_eq!(outcome.state, ConversationState::Escalated);
    assert_eq!(h.sms.sent_count().await, 2);
}

#[tokio::test]
async fn dev_mode_bypasses_escalation() {
    let h = harness(&[]).await;
    h.overrides.set_dev_mode(&h.lead("lead-1"), true);
    let outcome = replied(h.send_sms(PHONE, "call me please").await.unwrap());

    assert_eq!(outcome.state, ConversationState::Active);
    assert!(outcome.qualification.phone_interest);
    assert!(!outcome.qualification.should_escalate);
    assert!(outcome.qualification.escalation_bypassed);
    assert!(!h.crm.record(&h.lead("lead-1")).await.unwrap().escalated);
}

#[tokio::test]
async fn paused_lead_is_recorded_but_not_answered() {
    let h = harness(&[]).await;
    h.overrides.set_paused(&h.lead("lead-1"), true);
    let result = h.send_sms(PHONE, "Hi").await.unwrap();

    assert!(matches!(
        result,
        InboundResult::Suppressed {
            state: ConversationState::ManuallyPaused,
            ..
        }
    ));
    assert_eq!(h.sms.sent_count().await, 0);
    let store = decode_field(h.crm.free_text(&h.lead("lead-1")).await.as_deref());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn handoff_promise_in_reply_escalates() {
    let h = harness(&["Great, I'll have an agent call you today!"]).await;
    let outcome = replied(h.send_sms(PHONE, "What's the HOA fee?").await.unwrap());
    assert!(outcome.qualification.should_escalate);
    assert_eq!(outcome.state, ConversationState::Escalated);
    assert!(outcome.qualification.reasons.iter().any(|r| r.contains("have an agent call")));
}

#[tokio::test]
#[traced_test]
async fn unreadable_record_replies_without_touching_the_transcript() {
    let h = harness(&["Hi Ana!", "Happy to help."]).await;
    let lead = h.lead("lead-1");
    h.send_sms(PHONE, "Is 12 Elm still available?").await.unwrap();
    h.send_sms(PHONE, "What is the lot size?").await.unwrap();
    let stored = h.crm.free_text(&lead).await;
    assert_eq!(decode_field(stored.as_deref()).len(), 4);
    let writes = h.crm.write_count();
    let updates = h.crm.status_updates().await.len();

    h.crm.fail_get_lead(true);
    let result = h
        .handler
        .handle_inbound(InboundSms {
            from: PHONE.into(),
            body: "still interested".into(),
            provider_id: None,
            fallback_history: vec![entry(Direction::Outbound, "Are you still looking?")],
        })
        .await
        .unwrap();

    let outcome = replied(result);
    assert!(outcome.used_fallback);
    assert!(!outcome.persisted);
    assert_eq!(h.sms.sent_count().await, 3);
    let prompt = h.provider.last_prompt().await.unwrap();
    assert!(prompt.contains("Alex: Are you still looking?"));
    // Profile was unavailable, so the default name is used.
    assert!(prompt.contains("there: still interested"));

    assert_eq!(h.crm.free_text(&lead).await, stored);
    assert_eq!(h.crm.write_count(), writes);
    assert_eq!(h.crm.status_updates().await.len(), updates);
    assert!(logs_contain("re-read failed, replying without updating the transcript"));
}

#[tokio::test]
async fn provider_failure_still_persists_inbound() {
    let h = harness(&[]).await;
    h.provider.fail_requests(true);
    let err = h.send_sms(PHONE, "Hello").await.unwrap_err();

    assert!(matches!(err, LeadlineError::Provider { .. }));
    assert_eq!(h.sms.sent_count().await, 0);
    let store = decode_field(h.crm.free_text(&h.lead("lead-1")).await.as_deref());
    assert_eq!(store.len(), 1);
    assert_eq!(store.messages[0].content(), "Hello");
}

#[tokio::test]
async fn sms_failure_still_persists_inbound() {
    let h = harness(&[]).await;
    h.sms.fail_sends(true);
    let err = h.send_sms(PHONE, "Hello").await.unwrap_err();
    assert!(matches!(err, LeadlineError::Sms { .. }));
    let store = decode_field(h.crm.free_text(&h.lead("lead-1")).await.as_deref());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn operator_notes_survive_updates() {
    let h = harness(&[]).await;
    h.crm
        .set_free_text(&h.lead("lead-1"), "Prefers evenings.")
        .await;
    h.send_sms(PHONE, "Hi").await.unwrap();

    let field = h.crm.free_text(&h.lead("lead-1")).await.unwrap();
    assert!(field.starts_with("Prefers evenings.\n\n"));
    assert_eq!(decode_field(Some(&field)).len(), 2);
}

#[tokio::test]
async fn operator_message_and_reset() {
    let h = harness(&[]).await;
    let lead = h.lead("lead-1");
    h.send_sms(PHONE, "Hi").await.unwrap();

    let out = h.handler.send_outbound(&lead, "This is Dana from the team.").await.unwrap();
    assert_eq!(out.stats.count, 3);
    let store = decode_field(h.crm.free_text(&lead).await.as_deref());
    match &store.messages[2] {
        leadline_core::TranscriptEntry::Full(m) => {
            assert_eq!(m.kind, MessageKind::Sms);
            assert_eq!(m.external_ref.as_deref(), Some(out.delivery_ref.as_str()));
        }
        other => panic!("expected a full entry, got {other:?}"),
    }

    let stats = h.handler.reset_transcript(&lead).await.unwrap();
    assert_eq!(stats.count, 0);
    assert!(decode_field(h.crm.free_text(&lead).await.as_deref()).is_empty());
    assert_eq!(h.handler.transcript_stats(&lead).await.unwrap().count, 0);
}

#[tokio::test]
async fn concurrent_messages_for_one_lead_are_all_kept() {
    let h = Arc::new(harness(&[]).await);
    let mut tasks = Vec::new();
    for i in 0..8 {
        let h = Arc::clone(&h);
        tasks.push(tokio::spawn(async move {
            h.send_sms(PHONE, &format!("message {i}")).await
        }));
    }
    for task in tasks {
        replied(task.await.unwrap().unwrap());
    }

    let store = decode_field(h.crm.free_text(&h.lead("lead-1")).await.as_deref());
    assert_eq!(store.len(), 16);
    assert_eq!(store.inbound_count(), 8);
    assert!(h.handler.locks().is_empty());
}

#[tokio::test]
async fn lock_registry_forgets_finished_leads() {
    let phones: Vec<String> = (0..50).map(|i| format!("+1555000{i:04}")).collect();
    let mut builder = TestHarness::builder();
    for (i, phone) in phones.iter().enumerate() {
        builder = builder.with_lead(&format!("lead-{i}"), phone, None);
    }
    let h = builder.build().await.expect("harness should build");

    for phone in &phones {
        replied(h.send_sms(phone, "hello").await.unwrap());
    }
    assert!(h.handler.locks().is_empty());
}

#[tokio::test]
async fn operator_actions_on_missing_lead_fail() {
    let h = harness(&[]).await;
    let missing = LeadId::from("lead-404");

    let err = h.handler.send_outbound(&missing, "hello").await.unwrap_err();
    assert!(matches!(err, LeadlineError::LeadNotFound { ref lead_id } if *lead_id == missing));
    assert!(matches!(
        h.handler.reset_transcript(&missing).await,
        Err(LeadlineError::LeadNotFound { .. })
    ));
    assert_eq!(h.sms.sent_count().await, 0);
}

mod fixtures {
    use leadline_core::{Direction, Message, MessageId, MessageKind, TranscriptEntry};

    pub fn entry(direction: Direction, content: &str) -> TranscriptEntry {
        TranscriptEntry::Full(Message {
            id: MessageId::generate(),
            direction,
            kind: MessageKind::Sms,
            content: content.to_string(),
            timestamp: "2026-01-05T10:00:00Z".parse().unwrap(),
            external_ref: None,
            truncated: false,
        })
    }
}
