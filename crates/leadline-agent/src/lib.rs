// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation pipeline for the Leadline assistant.
//!
//! [`ConversationHandler`] ties the transcript, qualification and context
//! crates to the CRM, SMS and reply-provider adapters. [`LeadLocks`] keeps
//! writes to one lead's transcript in order; [`InMemoryOverrides`] holds the
//! operator's dev-mode and pause flags.

pub mod handler;
pub mod locks;
pub mod overrides;

pub use handler::{
    Collaborators, ConversationHandler, InboundOutcome, InboundResult, InboundSms,
    OutboundOutcome,
};
pub use locks::{LeadGuard, LeadLocks};
pub use overrides::InMemoryOverrides;
