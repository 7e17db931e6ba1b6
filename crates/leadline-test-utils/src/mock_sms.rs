// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock SMS transport capturing sent messages.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadline_core::traits::adapter::PluginAdapter;
use leadline_core::traits::sms::SmsAdapter;
use leadline_core::types::{AdapterType, HealthStatus};
use leadline_core::LeadlineError;

/// A sent message as captured by [`MockSms`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentSms {
    pub to: String,
    pub body: String,
    pub delivery_ref: String,
}

pub struct MockSms {
    sent: Arc<Mutex<Vec<SentSms>>>,
    fail: AtomicBool,
}

impl MockSms {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: AtomicBool::new(false),
        }
    }

    pub async fn sent_messages(&self) -> Vec<SentSms> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl Default for MockSms {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockSms {
    fn name(&self) -> &str {
        "mock-sms"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sms
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadlineError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl SmsAdapter for MockSms {
    async fn send(&self, to: &str, body: &str) -> Result<String, LeadlineError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(LeadlineError::sms("mock sms failure"));
        }
        let delivery_ref = format!("SM-mock-{}", uuid::Uuid::new_v4());
        self.sent.lock().await.push(SentSms {
            to: to.to_string(),
            body: body.to_string(),
            delivery_ref: delivery_ref.clone(),
        });
        Ok(delivery_ref)
    }
}
