// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Leadline integration tests.
//!
//! - [`MockCrm`]: in-memory lead records with injectable failures
//! - [`MockSms`]: captures sent messages
//! - [`MockProvider`]: scripted replies, captured prompts
//! - [`TestHarness`]: the full pipeline wired to the mocks

pub mod harness;
pub mod mock_crm;
pub mod mock_provider;
pub mod mock_sms;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_crm::MockCrm;
pub use mock_provider::MockProvider;
pub use mock_sms::{MockSms, SentSms};
