// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline tests.
//!
//! `TestHarness` wires a [`ConversationHandler`] to mock CRM, SMS and reply
//! adapters plus in-memory overrides, and exposes `send_sms()` to drive an
//! inbound message through the whole pipeline.

use std::sync::Arc;

use leadline_agent::{
    Collaborators, ConversationHandler, InMemoryOverrides, InboundResult, InboundSms,
};
use leadline_config::model::LeadlineConfig;
use leadline_context::PromptTemplate;
use leadline_core::{LeadId, LeadlineError};

use crate::mock_crm::MockCrm;
use crate::mock_provider::MockProvider;
use crate::mock_sms::MockSms;

struct SeedLead {
    id: String,
    phone: String,
    first_name: Option<String>,
}

/// Builder for test environments.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    config: LeadlineConfig,
    template: Option<String>,
    leads: Vec<SeedLead>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            config: LeadlineConfig::default(),
            template: None,
            leads: Vec::new(),
        }
    }

    /// Set mock provider responses, consumed in order.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    pub fn with_config(mut self, config: LeadlineConfig) -> Self {
        self.config = config;
        self
    }

    /// Use `template` instead of the built-in prompt.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Seed a lead with an empty transcript.
    pub fn with_lead(mut self, id: &str, phone: &str, first_name: Option<&str>) -> Self {
        self.leads.push(SeedLead {
            id: id.to_string(),
            phone: phone.to_string(),
            first_name: first_name.map(String::from),
        });
        self
    }

    pub async fn build(self) -> Result<TestHarness, LeadlineError> {
        let template = match self.template {
            Some(ref source) => PromptTemplate::parse(source)?,
            None => PromptTemplate::builtin(),
        };

        let crm = Arc::new(MockCrm::new());
        for lead in &self.leads {
            crm.add_lead(&lead.id, &lead.phone, lead.first_name.as_deref())
                .await;
        }
        let sms = Arc::new(MockSms::new());
        let provider = Arc::new(MockProvider::with_responses(self.responses));
        let overrides = Arc::new(InMemoryOverrides::new());

        let handler = ConversationHandler::new(
            &self.config,
            template,
            Collaborators {
                crm: crm.clone(),
                sms: sms.clone(),
                provider: provider.clone(),
                overrides: overrides.clone(),
            },
        );

        Ok(TestHarness {
            crm,
            sms,
            provider,
            overrides,
            handler,
            config: self.config,
        })
    }
}

/// A complete pipeline over mock adapters.
pub struct TestHarness {
    pub crm: Arc<MockCrm>,
    pub sms: Arc<MockSms>,
    pub provider: Arc<MockProvider>,
    pub overrides: Arc<InMemoryOverrides>,
    pub handler: ConversationHandler,
    pub config: LeadlineConfig,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Drives an inbound SMS without a provider id.
    pub async fn send_sms(&self, from: &str, body: &str) -> Result<InboundResult, LeadlineError> {
        self.handler
            .handle_inbound(InboundSms {
                from: from.to_string(),
                body: body.to_string(),
                ..InboundSms::default()
            })
            .await
    }

    /// Drives an inbound SMS carrying the provider's message id.
    pub async fn send_sms_with_id(
        &self,
        from: &str,
        body: &str,
        provider_id: &str,
    ) -> Result<InboundResult, LeadlineError> {
        self.handler
            .handle_inbound(InboundSms {
                from: from.to_string(),
                body: body.to_string(),
                provider_id: Some(provider_id.to_string()),
                fallback_history: Vec::new(),
            })
            .await
    }

    pub fn lead(&self, id: &str) -> LeadId {
        LeadId::from(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_builds_with_defaults() {
        let harness = TestHarness::builder()
            .with_lead("lead-1", "+15550000001", Some("Ana"))
            .build()
            .await
            .unwrap();
        assert!(harness.crm.record(&harness.lead("lead-1")).await.is_some());
        assert_eq!(harness.sms.sent_count().await, 0);
    }

    #[tokio::test]
    async fn bad_template_fails_build() {
        let result = TestHarness::builder()
            .with_template("Hi ${nme}")
            .build()
            .await;
        assert!(matches!(result, Err(LeadlineError::Template(_))));
    }
}
