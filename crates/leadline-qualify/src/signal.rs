// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Qualifying signals and the derived qualification status.

use std::collections::BTreeMap;

use leadline_core::MessageId;
use serde::{Deserialize, Serialize};

/// A topic whose presence in lead messages indicates sales readiness.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Signal {
    /// When the lead plans to buy or move.
    Timeline,
    /// Whether the lead already works with an agent.
    AgentStatus,
    /// Pre-approval, lender, cash purchase.
    Financing,
}

impl Signal {
    pub const ALL: [Signal; 3] = [Signal::Timeline, Signal::AgentStatus, Signal::Financing];

    /// Short phrase used when listing unanswered topics in a prompt.
    pub fn topic(self) -> &'static str {
        match self {
            Signal::Timeline => "their timeline for buying or moving",
            Signal::AgentStatus => "whether they already work with an agent",
            Signal::Financing => "their financing situation",
        }
    }
}

/// Evidence for one signal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalAnswer {
    pub answered: bool,
    /// Content of the first message that matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,
    /// The keyword that matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

/// Qualification state recomputed from the full transcript on every event.
///
/// Not persisted here; the caller pushes it to the CRM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualificationStatus {
    /// One entry per [`Signal`], answered or not.
    pub answered_signals: BTreeMap<Signal, SignalAnswer>,
    pub phone_interest: bool,
    pub scheduling_interest: bool,
    pub complete: bool,
    pub should_escalate: bool,
    /// Set when a caller override suppressed escalation. Signals and reasons
    /// are still reported.
    #[serde(default)]
    pub escalation_bypassed: bool,
    /// Escalation triggers in the order they were found.
    pub reasons: Vec<String>,
}

impl QualificationStatus {
    /// Status for a lead who has said nothing qualifying yet.
    pub fn empty() -> Self {
        Self {
            answered_signals: Signal::ALL
                .into_iter()
                .map(|s| (s, SignalAnswer::default()))
                .collect(),
            phone_interest: false,
            scheduling_interest: false,
            complete: false,
            should_escalate: false,
            escalation_bypassed: false,
            reasons: Vec::new(),
        }
    }

    pub fn is_answered(&self, signal: Signal) -> bool {
        self.answered_signals
            .get(&signal)
            .is_some_and(|a| a.answered)
    }

    /// Signals that are answered, in declaration order.
    pub fn answered(&self) -> Vec<Signal> {
        Signal::ALL
            .into_iter()
            .filter(|s| self.is_answered(*s))
            .collect()
    }

    /// Signals the assistant should still ask about.
    pub fn missing_signals(&self) -> Vec<Signal> {
        Signal::ALL
            .into_iter()
            .filter(|s| !self.is_answered(*s))
            .collect()
    }

    pub fn all_answered(&self) -> bool {
        self.missing_signals().is_empty()
    }

    /// Escalates because the drafted reply promised a human follow-up.
    ///
    /// The reason is recorded even when escalation is bypassed.
    pub fn record_handoff(&mut self, phrase: &str, bypass_escalation: bool) {
        self.reasons
            .push(format!("assistant promised a human follow-up (\"{phrase}\")"));
        if bypass_escalation {
            self.escalation_bypassed = true;
        } else {
            self.should_escalate = true;
        }
    }
}

impl Default for QualificationStatus {
    fn default() -> Self {
        Self::empty()
    }
}
