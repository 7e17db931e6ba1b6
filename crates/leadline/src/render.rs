// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadline render`: preview the prompt the assistant would receive.

use leadline_config::model::LeadlineConfig;
use leadline_context::{ContextAssembler, PromptTemplate};
use leadline_core::{LeadId, LeadProfile, LeadRecord, LeadlineError};
use leadline_qualify::QualificationEngine;
use leadline_transcript::decode;

use crate::blob::read_blob;

/// Renders the reply prompt for `message` arriving on top of the field `raw`.
pub fn render_prompt(
    config: &LeadlineConfig,
    template: &PromptTemplate,
    raw: &str,
    message: &str,
    lead_name: Option<&str>,
) -> String {
    let record = LeadRecord {
        lead_id: LeadId::from("preview"),
        profile: LeadProfile {
            first_name: lead_name.map(String::from),
            ..LeadProfile::default()
        },
        free_text: Some(raw.to_string()),
        escalated: false,
    };
    let assembler = ContextAssembler::new(&config.agent);
    let context = assembler.build_context(&record.lead_id, message, Ok(&record), &[]);

    let status = QualificationEngine::new(&config.qualification).analyze(&decode(raw).messages, false);
    let missing: Vec<&str> = status.missing_signals().into_iter().map(|s| s.topic()).collect();
    assembler.render_prompt(template, &context, &missing)
}

pub async fn run_render(
    config: &LeadlineConfig,
    input: &str,
    message: &str,
    lead_name: Option<&str>,
) -> Result<(), LeadlineError> {
    let template = leadline_context::load_template_strict(&config.prompt).await?;
    let raw = read_blob(input).await?;
    println!("{}", render_prompt(config, &template, &raw, message, lead_name));
    Ok(())
}
