// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply context for the Leadline assistant.
//!
//! - [`assembler`]: stored transcript + lead profile + current message, with
//!   a caller-supplied fallback history when the CRM copy is empty or
//!   unreachable.
//! - [`template`]: `${placeholder}` prompt templates over a closed set of
//!   names, rejected at load time when they reference anything else.

pub mod assembler;
pub mod template;

pub use assembler::{AssembledContext, ContextAssembler};
pub use template::{
    DEFAULT_TEMPLATE, Placeholder, PromptParams, PromptTemplate, TemplateError, load_template,
    load_template_strict,
};
