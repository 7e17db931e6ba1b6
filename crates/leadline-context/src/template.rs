// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed reply-prompt templates.
//!
//! Templates use `${name}` placeholders drawn from a closed set. Parsing
//! rejects anything outside that set, so a typo in an operator's template
//! fails at startup instead of reaching the model as literal `${...}` text.

use std::str::FromStr;
use std::sync::LazyLock;

use leadline_config::model::PromptConfig;
use leadline_core::LeadlineError;
use regex::Regex;
use tracing::{info, warn};

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]*)\}").unwrap());

const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Built-in template used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "\
You are ${assistant_name}, texting on behalf of ${brokerage} with ${lead_name}, \
a lead who asked about a property.
Keep replies short, warm and conversational, under 300 characters, with at most one question.
Still unknown about the lead: ${missing_signals}. When it fits naturally, ask about one of these.
If they want a call or a showing, tell them an agent will reach out.

Conversation so far:
${history}

${lead_name}: ${current_message}
${assistant_name}:";

/// A value a template may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Placeholder {
    LeadName,
    AssistantName,
    Brokerage,
    History,
    CurrentMessage,
    MissingSignals,
}

impl Placeholder {
    pub const ALL: [Placeholder; 6] = [
        Placeholder::LeadName,
        Placeholder::AssistantName,
        Placeholder::Brokerage,
        Placeholder::History,
        Placeholder::CurrentMessage,
        Placeholder::MissingSignals,
    ];

    fn value<'a>(self, params: &PromptParams<'a>) -> &'a str {
        match self {
            Placeholder::LeadName => params.lead_name,
            Placeholder::AssistantName => params.assistant_name,
            Placeholder::Brokerage => params.brokerage,
            Placeholder::History => params.history,
            Placeholder::CurrentMessage => params.current_message,
            Placeholder::MissingSignals => params.missing_signals,
        }
    }
}

/// Values substituted into a template. One field per [`Placeholder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromptParams<'a> {
    pub lead_name: &'a str,
    pub assistant_name: &'a str,
    pub brokerage: &'a str,
    pub history: &'a str,
    pub current_message: &'a str,
    pub missing_signals: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unknown placeholder `${{{name}}}` at byte {offset}{}", suggestion_suffix(.suggestion))]
    UnknownPlaceholder {
        name: String,
        offset: usize,
        suggestion: Option<String>,
    },

    #[error("empty placeholder `${{}}` at byte {offset}")]
    EmptyPlaceholder { offset: usize },

    #[error("unterminated placeholder at byte {offset}")]
    Unterminated { offset: usize },

    #[error("failed to read template file {path}: {message}")]
    Io { path: String, message: String },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean `${{{s}}}`?)"),
        None => String::new(),
    }
}

impl From<TemplateError> for LeadlineError {
    fn from(e: TemplateError) -> Self {
        LeadlineError::Template(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Slot(Placeholder),
}

/// A parsed template. Rendering cannot fail once parsing succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut last = 0;

        for caps in PLACEHOLDER_RE.captures_iter(source) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            push_text(&mut segments, &source[last..whole.start()], last)?;

            let name = inner.as_str().trim();
            if name.is_empty() {
                return Err(TemplateError::EmptyPlaceholder {
                    offset: whole.start(),
                });
            }
            let placeholder =
                Placeholder::from_str(name).map_err(|_| TemplateError::UnknownPlaceholder {
                    name: name.to_string(),
                    offset: whole.start(),
                    suggestion: suggest(name),
                })?;
            segments.push(Segment::Slot(placeholder));
            last = whole.end();
        }
        push_text(&mut segments, &source[last..], last)?;

        Ok(Self { segments })
    }

    /// The built-in template.
    pub fn builtin() -> Self {
        // The built-in template only uses known placeholders.
        Self::parse(DEFAULT_TEMPLATE).unwrap_or_else(|_| Self {
            segments: vec![Segment::Text(DEFAULT_TEMPLATE.to_string())],
        })
    }

    pub fn render(&self, params: &PromptParams<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Slot(p) => out.push_str(p.value(params)),
            }
        }
        out
    }

    /// Placeholders referenced, in order of first use.
    pub fn placeholders(&self) -> Vec<Placeholder> {
        let mut seen = Vec::new();
        for segment in &self.segments {
            if let Segment::Slot(p) = segment {
                if !seen.contains(p) {
                    seen.push(*p);
                }
            }
        }
        seen
    }
}

fn push_text(segments: &mut Vec<Segment>, text: &str, base: usize) -> Result<(), TemplateError> {
    if let Some(pos) = text.find("${") {
        return Err(TemplateError::Unterminated { offset: base + pos });
    }
    if !text.is_empty() {
        segments.push(Segment::Text(text.to_string()));
    }
    Ok(())
}

fn suggest(name: &str) -> Option<String> {
    let mut best_score = SUGGESTION_THRESHOLD;
    let mut best = None;
    for p in Placeholder::ALL {
        let candidate = p.to_string();
        let score = strsim::jaro_winkler(name, &candidate);
        if score > best_score {
            best_score = score;
            best = Some(candidate);
        }
    }
    best
}

/// Loads the reply template: file > inline > built-in.
///
/// An unreadable file falls back to the next source with a warning. A
/// template that does not parse is an error.
pub async fn load_template(config: &PromptConfig) -> Result<PromptTemplate, TemplateError> {
    if let Some(ref path) = config.template_file {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    let template = PromptTemplate::parse(trimmed)?;
                    info!(path = path.as_str(), "loaded prompt template from file");
                    return Ok(template);
                }
                warn!(path = path.as_str(), "prompt template file is empty, falling back");
            }
            Err(e) => {
                warn!(
                    path = path.as_str(),
                    error = %e,
                    "failed to read prompt template file, falling back"
                );
            }
        }
    }

    if let Some(ref inline) = config.template {
        if !inline.trim().is_empty() {
            return PromptTemplate::parse(inline);
        }
    }

    Ok(PromptTemplate::builtin())
}

/// Like [`load_template`] but an unreadable file is an error.
pub async fn load_template_strict(config: &PromptConfig) -> Result<PromptTemplate, TemplateError> {
    if let Some(ref path) = config.template_file {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| TemplateError::Io {
                path: path.clone(),
                message: e.to_string(),
            })?;
        return PromptTemplate::parse(content.trim());
    }
    load_template(config).await
}
