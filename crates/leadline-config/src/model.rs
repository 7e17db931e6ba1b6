// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Leadline.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Leadline configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values. Built once at
/// process start and handed by reference to each component constructor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LeadlineConfig {
    /// Assistant identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Transcript size limits and compression policy.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Keyword lists and escalation thresholds.
    #[serde(default)]
    pub qualification: QualificationConfig,

    /// Reply prompt template.
    #[serde(default)]
    pub prompt: PromptConfig,
}

/// Assistant identity configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Name the assistant signs with and is quoted as in transcripts.
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,

    /// Brokerage or team the assistant texts on behalf of.
    #[serde(default = "default_brokerage")]
    pub brokerage: String,

    /// Fallback used when the CRM has no name for the lead.
    #[serde(default = "default_lead_name")]
    pub default_lead_name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            assistant_name: default_assistant_name(),
            brokerage: default_brokerage(),
            default_lead_name: default_lead_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_assistant_name() -> String {
    "Alex".to_string()
}

fn default_brokerage() -> String {
    "our team".to_string()
}

fn default_lead_name() -> String {
    "there".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Transcript storage limits.
///
/// The CRM free-text field holds about 64 KB; the ceiling stays under it so
/// operator notes outside the transcript block still fit.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Maximum number of messages kept per lead (oldest evicted first).
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,

    /// Hard ceiling on the encoded transcript block, in bytes.
    #[serde(default = "default_ceiling_bytes")]
    pub ceiling_bytes: usize,

    /// Capacity of the CRM free-text field, in bytes.
    #[serde(default = "default_crm_field_capacity")]
    pub crm_field_capacity: usize,

    /// Compression policy applied when nearing the ceiling.
    #[serde(default)]
    pub compression: CompressionConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
            ceiling_bytes: default_ceiling_bytes(),
            crm_field_capacity: default_crm_field_capacity(),
            compression: CompressionConfig::default(),
        }
    }
}

fn default_max_messages() -> usize {
    100
}

fn default_ceiling_bytes() -> usize {
    60_000
}

fn default_crm_field_capacity() -> usize {
    65_536
}

/// Compression policy for older transcript entries.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompressionConfig {
    /// When false, only hard truncation protects the ceiling.
    #[serde(default = "default_compression_enabled")]
    pub enabled: bool,

    /// Fraction of `ceiling_bytes` (0.0-1.0] above which compression runs.
    #[serde(default = "default_compression_threshold")]
    pub threshold: f64,

    /// Baseline number of messages the policy tries to retain.
    #[serde(default = "default_min_retained")]
    pub min_retained: usize,

    /// Share of `min_retained` kept at full fidelity (the most recent ones).
    #[serde(default = "default_recent_fraction")]
    pub recent_fraction: f64,

    /// Maximum characters of content kept in a compressed entry.
    #[serde(default = "default_compressed_length")]
    pub compressed_length: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: default_compression_enabled(),
            threshold: default_compression_threshold(),
            min_retained: default_min_retained(),
            recent_fraction: default_recent_fraction(),
            compressed_length: default_compressed_length(),
        }
    }
}

impl CompressionConfig {
    /// Number of most recent entries left at full fidelity by a compression pass.
    pub fn recent_full(&self) -> usize {
        let raw = (self.min_retained as f64 * self.recent_fraction).ceil();
        if raw.is_finite() && raw > 0.0 {
            raw as usize
        } else {
            0
        }
    }
}

fn default_compression_enabled() -> bool {
    true
}

fn default_compression_threshold() -> f64 {
    0.70
}

fn default_min_retained() -> usize {
    20
}

fn default_recent_fraction() -> f64 {
    0.5
}

fn default_compressed_length() -> usize {
    100
}

/// Keyword lists driving the qualification engine.
///
/// Matching is case-insensitive substring search against inbound content.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QualificationConfig {
    /// Evidence the lead shared a buying or moving timeline.
    #[serde(default = "default_timeline_keywords")]
    pub timeline: Vec<String>,

    /// Evidence the lead said whether they work with an agent.
    #[serde(default = "default_agent_status_keywords")]
    pub agent_status: Vec<String>,

    /// Evidence the lead talked about financing.
    #[serde(default = "default_financing_keywords")]
    pub financing: Vec<String>,

    /// Requests for a phone call.
    #[serde(default = "default_phone_keywords")]
    pub phone: Vec<String>,

    /// Requests for a showing or appointment.
    #[serde(default = "default_scheduling_keywords")]
    pub scheduling: Vec<String>,

    /// Phrases in a drafted reply that promise a human follow-up.
    #[serde(default = "default_handoff_phrases")]
    pub handoff: Vec<String>,

    /// Answered signals needed for the high-engagement escalation rule.
    #[serde(default = "default_engagement_min_signals")]
    pub engagement_min_signals: usize,

    /// Inbound messages needed for the high-engagement escalation rule.
    #[serde(default = "default_engagement_min_inbound")]
    pub engagement_min_inbound: usize,
}

impl Default for QualificationConfig {
    fn default() -> Self {
        Self {
            timeline: default_timeline_keywords(),
            agent_status: default_agent_status_keywords(),
            financing: default_financing_keywords(),
            phone: default_phone_keywords(),
            scheduling: default_scheduling_keywords(),
            handoff: default_handoff_phrases(),
            engagement_min_signals: default_engagement_min_signals(),
            engagement_min_inbound: default_engagement_min_inbound(),
        }
    }
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn default_timeline_keywords() -> Vec<String> {
    owned(&[
        "month", "week", "year", "asap", "soon", "right away", "immediately", "timeline",
        "spring", "summer", "fall", "winter", "lease ends", "move in", "moving",
        "not in a rush", "no rush", "just looking", "browsing",
    ])
}

fn default_agent_status_keywords() -> Vec<String> {
    owned(&[
        "agent", "realtor", "broker", "working with", "represented", "on my own",
    ])
}

fn default_financing_keywords() -> Vec<String> {
    owned(&[
        "pre-approved", "preapproved", "pre approved", "pre-qualified", "prequalified",
        "mortgage", "loan", "lender", "financing", "cash buyer", "paying cash",
        "down payment", "fha", "va loan",
    ])
}

fn default_phone_keywords() -> Vec<String> {
    owned(&[
        "call me", "give me a call", "phone call", "can you call", "could you call",
        "call you", "talk on the phone", "speak to someone", "talk to someone",
        "speak with someone", "talk to a person", "talk to an agent",
    ])
}

fn default_scheduling_keywords() -> Vec<String> {
    owned(&[
        "schedule", "appointment", "showing", "tour", "see the house", "see the home",
        "see it in person", "walk through", "walkthrough", "open house", "set up a time",
    ])
}

fn default_handoff_phrases() -> Vec<String> {
    owned(&[
        "have an agent call",
        "have one of our agents",
        "connect you with",
        "an agent will reach out",
        "agent will be in touch",
        "someone will call you",
    ])
}

fn default_engagement_min_signals() -> usize {
    2
}

fn default_engagement_min_inbound() -> usize {
    4
}

/// Reply prompt configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PromptConfig {
    /// Inline template. Overridden by `template_file` if both set.
    #[serde(default)]
    pub template: Option<String>,

    /// Path to a template file. Takes precedence over `template`.
    #[serde(default)]
    pub template_file: Option<String>,
}
