// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment extraction failures into miette reports.
//!
//! A typo such as `celing_bytes` under `[storage]` is reported with the
//! offending line highlighted and the closest valid key offered as a fix.

#![allow(unused_assignments)] // emitted by the miette Diagnostic derive

use std::fmt::Write as _;

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a candidate must beat before it is offered as a fix.
const MIN_SIMILARITY: f64 = 0.75;

/// Every way a Leadline configuration can be rejected.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("`{key}` is not a Leadline setting")]
    #[diagnostic(
        code(leadline::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Closest valid key, when one is similar enough.
        suggestion: Option<String>,
        /// Comma-separated keys accepted in the same section.
        valid_keys: String,
        #[label("unrecognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(code(leadline::config::invalid_type), help("use a {expected} here"))]
    InvalidType {
        /// Dotted path, e.g. `storage.max_messages`.
        key: String,
        detail: String,
        expected: String,
    },

    #[error("`{key}` must be set")]
    #[diagnostic(code(leadline::config::missing_key))]
    MissingKey { key: String },

    /// A value parsed but breaks a cross-field or range rule.
    #[error("{message}")]
    #[diagnostic(code(leadline::config::validation))]
    Validation { message: String },

    #[error("{0}")]
    #[diagnostic(code(leadline::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    let mut help = String::new();
    if let Some(fix) = suggestion {
        let _ = write!(help, "did you mean `{fix}`? ");
    }
    let _ = write!(help, "accepted here: {valid_keys}");
    help
}

/// TOML texts that fed a load, keyed by the path figment reports.
#[derive(Debug, Default)]
pub struct SourceFiles {
    files: Vec<(String, String)>,
}

impl SourceFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.files.push((name.into(), text.into()));
    }

    fn get(&self, name: &str) -> Option<(&str, &str)> {
        self.files
            .iter()
            .find(|(n, _)| n == name)
            .map(|(n, text)| (n.as_str(), text.as_str()))
    }

    /// The file figment attributed `error` to, or the only file loaded.
    fn origin_of(&self, error: &figment::Error) -> Option<(&str, &str)> {
        let reported = error
            .metadata
            .as_ref()
            .and_then(|meta| meta.source.as_ref())
            .and_then(|source| match source {
                figment::Source::File(path) => Some(path.display().to_string()),
                _ => None,
            });
        reported
            .and_then(|name| self.get(&name))
            .or_else(|| self.sole())
    }

    fn sole(&self) -> Option<(&str, &str)> {
        match self.files.as_slice() {
            [(name, text)] => Some((name.as_str(), text.as_str())),
            _ => None,
        }
    }

    /// Span and source for `key` inside `section`, for labelling.
    fn locate(
        &self,
        error: &figment::Error,
        section: &[String],
        key: &str,
    ) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
        let Some((name, text)) = self.origin_of(error) else {
            return (None, None);
        };
        match find_key_offset(text, section, key) {
            Some(offset) => (
                Some(SourceSpan::new(offset.into(), key.len())),
                Some(NamedSource::new(name, text.to_string())),
            ),
            None => (None, None),
        }
    }
}

/// Converts every error folded into `err` into a [`ConfigError`].
pub fn figment_to_config_errors(err: figment::Error, sources: &SourceFiles) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| {
            let section: Vec<String> = error.path.clone();
            match &error.kind {
                Kind::UnknownField(key, accepted) => {
                    let (span, src) = sources.locate(&error, &section, key);
                    ConfigError::UnknownKey {
                        key: key.clone(),
                        suggestion: suggest_key(key, accepted),
                        valid_keys: accepted.join(", "),
                        span,
                        src,
                    }
                }
                Kind::MissingField(key) => ConfigError::MissingKey {
                    key: key.to_string(),
                },
                Kind::InvalidType(found, expected) => ConfigError::InvalidType {
                    key: section.join("."),
                    detail: format!("found {found}"),
                    expected: expected.clone(),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// Byte offset of `key` as an assignment inside the `[section]` table.
///
/// An empty section searches from the top of the file. Only the text after
/// the section header is scanned, so a same-named key in an earlier table
/// is not matched.
pub fn find_key_offset(text: &str, section: &[String], key: &str) -> Option<usize> {
    let body_start = if section.is_empty() {
        0
    } else {
        let header = format!("[{}]", section.join("."));
        text.find(&header)? + header.len()
    };

    let mut line_start = body_start;
    for line in text[body_start..].split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let rest = &line[indent..];
        let assigns = rest
            .strip_prefix(key)
            .is_some_and(|after| after.trim_start().starts_with('='));
        if assigns {
            return Some(line_start + indent);
        }
        line_start += line.len();
    }
    None
}

/// The accepted key closest to `unknown`, if any scores above the cutoff.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|&candidate| (strsim::jaro_winkler(unknown, candidate), candidate))
        .filter(|(score, _)| *score > MIN_SIMILARITY)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate.to_string())
}

/// Writes each error to stderr as a graphical miette report.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("config error: {error}"),
        }
    }
}
