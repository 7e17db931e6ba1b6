// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword scan over inbound messages and the escalation rules.
//!
//! Rules, checked in this order, each adding a reason when it fires:
//!
//! 1. the lead asked for a phone call
//! 2. the lead asked to schedule a showing or appointment
//! 3. all qualifying signals are answered
//! 4. high engagement: enough signals answered over enough inbound messages
//!
//! `complete` is rules 1-3. `should_escalate` is any rule, unless the caller
//! bypasses escalation for this lead.

use leadline_config::model::QualificationConfig;
use leadline_core::TranscriptEntry;
use tracing::debug;

use crate::signal::{QualificationStatus, Signal, SignalAnswer};

/// Lowercased, trimmed keyword list with blanks removed.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Keywords(Vec<String>);

impl Keywords {
    fn new(raw: &[String]) -> Self {
        Self(
            raw.iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        )
    }

    /// First keyword contained in `lower`.
    fn find(&self, lower: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|k| lower.contains(k.as_str()))
            .map(String::as_str)
    }
}

/// Stateless qualification rules built from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualificationEngine {
    timeline: Keywords,
    agent_status: Keywords,
    financing: Keywords,
    phone: Keywords,
    scheduling: Keywords,
    handoff: Keywords,
    engagement_min_signals: usize,
    engagement_min_inbound: usize,
}

impl QualificationEngine {
    pub fn new(config: &QualificationConfig) -> Self {
        Self {
            timeline: Keywords::new(&config.timeline),
            agent_status: Keywords::new(&config.agent_status),
            financing: Keywords::new(&config.financing),
            phone: Keywords::new(&config.phone),
            scheduling: Keywords::new(&config.scheduling),
            handoff: Keywords::new(&config.handoff),
            engagement_min_signals: config.engagement_min_signals,
            engagement_min_inbound: config.engagement_min_inbound,
        }
    }

    fn keywords(&self, signal: Signal) -> &Keywords {
        match signal {
            Signal::Timeline => &self.timeline,
            Signal::AgentStatus => &self.agent_status,
            Signal::Financing => &self.financing,
        }
    }

    /// Recomputes qualification from the full message list.
    ///
    /// Outbound messages are ignored. Each signal takes the first inbound
    /// message that matches and is never overwritten by a later one. With
    /// `bypass_escalation` set the signals and reasons are still computed but
    /// `should_escalate` is forced to false.
    pub fn analyze(&self, messages: &[TranscriptEntry], bypass_escalation: bool) -> QualificationStatus {
        let mut status = QualificationStatus::empty();
        let mut inbound = 0usize;

        for entry in messages.iter().filter(|e| e.is_inbound()) {
            inbound += 1;
            let lower = entry.content().to_lowercase();

            for signal in Signal::ALL {
                if status.is_answered(signal) {
                    continue;
                }
                if let Some(keyword) = self.keywords(signal).find(&lower) {
                    status.answered_signals.insert(
                        signal,
                        SignalAnswer {
                            answered: true,
                            evidence: Some(entry.content().to_string()),
                            message_id: Some(entry.id().clone()),
                            keyword: Some(keyword.to_string()),
                        },
                    );
                }
            }

            if !status.phone_interest && self.phone.find(&lower).is_some() {
                status.phone_interest = true;
            }
            if !status.scheduling_interest && self.scheduling.find(&lower).is_some() {
                status.scheduling_interest = true;
            }
        }

        let answered = status.answered().len();
        let all_answered = status.all_answered();
        let mut escalate = false;

        if status.phone_interest {
            status.reasons.push("lead asked for a phone call".to_string());
            escalate = true;
        }
        if status.scheduling_interest {
            status
                .reasons
                .push("lead wants to schedule a showing or appointment".to_string());
            escalate = true;
        }
        if all_answered {
            status
                .reasons
                .push("all qualifying signals answered".to_string());
            escalate = true;
        }
        if !all_answered
            && answered >= self.engagement_min_signals
            && inbound >= self.engagement_min_inbound
        {
            status.reasons.push(format!(
                "high engagement: {answered} signals answered over {inbound} inbound messages"
            ));
            escalate = true;
        }

        status.complete = all_answered || status.phone_interest || status.scheduling_interest;
        if bypass_escalation && escalate {
            status.escalation_bypassed = true;
        }
        status.should_escalate = escalate && !bypass_escalation;

        debug!(
            inbound,
            answered,
            complete = status.complete,
            should_escalate = status.should_escalate,
            bypassed = status.escalation_bypassed,
            "qualification analyzed"
        );
        status
    }

    /// The handoff phrase in a drafted reply, if the assistant promised that a
    /// human will follow up.
    pub fn detect_handoff(&self, reply: &str) -> Option<&str> {
        self.handoff.find(&reply.to_lowercase())
    }

    /// [`analyze`](Self::analyze) plus a handoff scan of the reply about to
    /// be sent.
    pub fn analyze_with_reply(
        &self,
        messages: &[TranscriptEntry],
        reply: &str,
        bypass_escalation: bool,
    ) -> QualificationStatus {
        let mut status = self.analyze(messages, bypass_escalation);
        if let Some(phrase) = self.detect_handoff(reply) {
            status.record_handoff(phrase, bypass_escalation);
        }
        status
    }
}
