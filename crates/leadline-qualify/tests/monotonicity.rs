// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signals are set-once: more messages never un-answer a signal.

use chrono::{TimeZone, Utc};
use leadline_config::model::QualificationConfig;
use leadline_core::{Direction, Message, MessageId, MessageKind, TranscriptEntry};
use leadline_qualify::{QualificationEngine, Signal};
use proptest::prelude::*;

const PHRASES: &[&str] = &[
    "Hi there",
    "Thanks!",
    "We hope to move in the spring",
    "No agent yet",
    "Already pre-approved",
    "Can you call me?",
    "I'd love a tour",
    "What's the HOA fee?",
    "ok",
];

fn entry_strategy() -> impl Strategy<Value = TranscriptEntry> {
    (any::<bool>(), prop::sample::select(PHRASES)).prop_map(|(inbound, text)| {
        TranscriptEntry::Full(Message {
            id: MessageId::generate(),
            direction: if inbound {
                Direction::Inbound
            } else {
                Direction::Outbound
            },
            kind: MessageKind::Sms,
            content: text.to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            external_ref: None,
            truncated: false,
        })
    })
}

proptest! {
    #[test]
    fn answered_signals_survive_appends(
        messages in prop::collection::vec(entry_strategy(), 0..20),
        split in 0usize..20,
    ) {
        let engine = QualificationEngine::new(&QualificationConfig::default());
        let split = split.min(messages.len());
        let prefix = engine.analyze(&messages[..split], false);
        let full = engine.analyze(&messages, false);

        for signal in Signal::ALL {
            if prefix.is_answered(signal) {
                prop_assert!(full.is_answered(signal));
                prop_assert_eq!(
                    &prefix.answered_signals[&signal],
                    &full.answered_signals[&signal]
                );
            }
        }
        prop_assert!(!prefix.phone_interest || full.phone_interest);
        prop_assert!(!prefix.scheduling_interest || full.scheduling_interest);
        prop_assert!(!prefix.should_escalate || full.should_escalate);
    }

    #[test]
    fn bypass_only_changes_the_escalation_flag(
        messages in prop::collection::vec(entry_strategy(), 0..20),
    ) {
        let engine = QualificationEngine::new(&QualificationConfig::default());
        let normal = engine.analyze(&messages, false);
        let bypassed = engine.analyze(&messages, true);

        prop_assert!(!bypassed.should_escalate);
        prop_assert_eq!(&normal.answered_signals, &bypassed.answered_signals);
        prop_assert_eq!(normal.complete, bypassed.complete);
        prop_assert_eq!(&normal.reasons, &bypassed.reasons);
        prop_assert_eq!(normal.should_escalate, bypassed.escalation_bypassed);
    }
}
