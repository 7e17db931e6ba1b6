// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Leadline SMS lead assistant.
//!
//! This crate provides the message and lead types shared by every other
//! crate, the error taxonomy, and the traits through which the pipeline
//! reaches the CRM, the SMS transport, the reply model and the operator
//! override store.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::LeadlineError;
pub use types::{
    AdapterType, CompressedMessage, ConversationState, Direction, HealthStatus, LeadId,
    LeadProfile, LeadRecord, Message, MessageId, MessageKind, TranscriptEntry,
};

pub use traits::{
    CrmAdapter, LeadStatusUpdate, OverrideStore, PluginAdapter, ReplyProvider, SmsAdapter,
};

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn leadline_error_displays_context() {
        let err = LeadlineError::LeadNotFound {
            lead_id: LeadId::from("lead-7"),
        };
        assert_eq!(err.to_string(), "lead lead-7 not found");
        assert_eq!(LeadlineError::crm("down").to_string(), "crm error: down");
        assert_eq!(LeadlineError::sms("rejected").to_string(), "sms error: rejected");
        assert_eq!(
            LeadlineError::provider("timeout").to_string(),
            "provider error: timeout"
        );
    }

    #[test]
    fn direction_and_kind_wire_names() {
        assert_eq!(serde_json::to_string(&Direction::Inbound).unwrap(), "\"inbound\"");
        assert_eq!(
            serde_json::to_string(&MessageKind::AiGenerated).unwrap(),
            "\"ai-generated\""
        );
        assert_eq!(MessageKind::from_str("ai-generated").unwrap(), MessageKind::AiGenerated);
        assert_eq!(Direction::Outbound.to_string(), "outbound");
    }

    #[test]
    fn adapter_type_round_trips_through_strings() {
        for variant in [
            AdapterType::Crm,
            AdapterType::Sms,
            AdapterType::Reply,
            AdapterType::Overrides,
        ] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_crm_adapter<T: CrmAdapter>() {}
        fn _assert_sms_adapter<T: SmsAdapter>() {}
        fn _assert_reply_provider<T: ReplyProvider>() {}
        fn _assert_override_store<T: OverrideStore>() {}
    }
}
