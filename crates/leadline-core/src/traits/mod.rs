// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits for the external collaborators.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod crm;
pub mod overrides;
pub mod reply;
pub mod sms;

pub use adapter::PluginAdapter;
pub use crm::{CrmAdapter, LeadStatusUpdate};
pub use overrides::OverrideStore;
pub use reply::ReplyProvider;
pub use sms::SmsAdapter;
