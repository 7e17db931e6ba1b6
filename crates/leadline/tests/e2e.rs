// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the complete Leadline pipeline.
//!
//! Each test builds an isolated TestHarness over mock CRM, SMS and reply
//! adapters. Tests are independent and order-insensitive.

use leadline_agent::InboundResult;
use leadline_config::load_and_validate_str;
use leadline_core::ConversationState;
use leadline_test_utils::TestHarness;
use leadline_transcript::{decode_field, encoded_len};

const PHONE: &str = "+15557654321";

// ---- Test 1: qualification conversation ----

#[tokio::test]
async fn test_full_qualification_conversation_escalates() {
    let harness = TestHarness::builder()
        .with_lead("lead-7", PHONE, Some("Sam"))
        .with_mock_responses(vec![
            "Great! When are you hoping to move?".to_string(),
            "Are you working with an agent yet?".to_string(),
            "Thanks! Have you talked with a lender?".to_string(),
        ])
        .build()
        .await
        .unwrap();

    let steps = [
        "Hi, saw the listing on Oak Ave",
        "We want to move in 2 months",
        "I'm working with another agent",
    ];
    for body in steps {
        let result = harness.send_sms(PHONE, body).await.unwrap();
        assert!(matches!(result, InboundResult::Replied(_)));
    }

    let result = harness.send_sms(PHONE, "I'm pre-approved for financing").await.unwrap();
    let InboundResult::Replied(outcome) = result else {
        panic!("expected a reply");
    };
    assert!(outcome.qualification.complete);
    assert!(outcome.qualification.should_escalate);
    assert_eq!(outcome.state, ConversationState::Escalated);
    assert!(outcome.qualification.missing_signals().is_empty());

    let updates = harness.crm.status_updates().await;
    let last = &updates.last().unwrap().1;
    assert_eq!(last.answered_signals, vec!["timeline", "agent-status", "financing"]);
    assert!(last.escalated);

    // Escalated leads get no further automated replies.
    let after = harness.send_sms(PHONE, "Hello?").await.unwrap();
    assert!(matches!(after, InboundResult::Suppressed { .. }));
    assert_eq!(harness.sms.sent_count().await, 4);
}

// ---- Test 2: storage stays bounded over a long conversation ----

#[tokio::test]
async fn test_long_conversation_stays_under_ceiling() {
    let config = load_and_validate_str(
        r#"
[storage]
max_messages = 30
ceiling_bytes = 6000

[storage.compression]
min_retained = 6
compressed_length = 40
"#,
    )
    .expect("test config should validate");

    let harness = TestHarness::builder()
        .with_config(config)
        .with_lead("lead-8", PHONE, None)
        .build()
        .await
        .unwrap();

    let long_body = "The kitchen photos look great but I had a question about the yard. ".repeat(3);
    for i in 0..25 {
        let result = harness
            .send_sms(PHONE, &format!("{i}: {long_body}"))
            .await
            .unwrap();
        assert!(matches!(result, InboundResult::Replied(_)));
    }

    let store = decode_field(harness.crm.free_text(&harness.lead("lead-8")).await.as_deref());
    assert!(store.len() <= 30);
    assert!(encoded_len(&store) <= 6000);
    assert!(store.compressed);
    assert!(store.messages.iter().any(|e| e.is_compressed()));
    let newest = store.messages.iter().rev().find(|e| e.is_inbound()).unwrap();
    assert!(newest.content().starts_with("24: "));
    assert!(!newest.is_compressed());
}

// ---- Test 3: custom template ----

#[tokio::test]
async fn test_custom_template_reaches_the_provider() {
    let harness = TestHarness::builder()
        .with_lead("lead-9", PHONE, Some("Kim"))
        .with_template("[${brokerage}] ${lead_name} says: ${current_message}")
        .build()
        .await
        .unwrap();

    harness.send_sms(PHONE, "Is parking included?").await.unwrap();
    assert_eq!(
        harness.provider.last_prompt().await.as_deref(),
        Some("[our team] Kim says: Is parking included?")
    );
}

#[tokio::test]
async fn test_unknown_template_placeholder_is_rejected() {
    let result = TestHarness::builder()
        .with_template("Hi ${lead_first_name}")
        .build()
        .await;
    let Err(err) = result else {
        panic!("template with unknown placeholder should fail");
    };
    assert!(err.to_string().contains("lead_first_name"));
}
