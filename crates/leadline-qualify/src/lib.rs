// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead qualification for the Leadline assistant.
//!
//! Scans a lead's inbound messages for qualifying signals and decides whether
//! the conversation should be handed to a human agent. Keyword matching
//! only: no model call, no network, same input gives the same answer.

pub mod engine;
pub mod signal;

pub use engine::QualificationEngine;
pub use signal::{QualificationStatus, Signal, SignalAnswer};
