// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as the ceiling fitting inside the CRM field and sane fractions.

use crate::diagnostic::ConfigError;
use crate::model::LeadlineConfig;

/// Smallest ceiling that still holds the transcript envelope plus a message.
pub const MIN_CEILING_BYTES: usize = 1024;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &LeadlineConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let storage = &config.storage;
    let compression = &storage.compression;

    if storage.max_messages == 0 {
        errors.push(invalid("storage.max_messages must be at least 1".to_string()));
    }

    if storage.ceiling_bytes < MIN_CEILING_BYTES {
        errors.push(invalid(format!(
            "storage.ceiling_bytes must be at least {MIN_CEILING_BYTES}, got {}",
            storage.ceiling_bytes
        )));
    }

    if storage.ceiling_bytes > storage.crm_field_capacity {
        errors.push(invalid(format!(
            "storage.ceiling_bytes ({}) must not exceed storage.crm_field_capacity ({})",
            storage.ceiling_bytes, storage.crm_field_capacity
        )));
    }

    if !(compression.threshold > 0.0 && compression.threshold <= 1.0) {
        errors.push(invalid(format!(
            "storage.compression.threshold must be in (0, 1], got {}",
            compression.threshold
        )));
    }

    if !(0.0..=1.0).contains(&compression.recent_fraction) {
        errors.push(invalid(format!(
            "storage.compression.recent_fraction must be in [0, 1], got {}",
            compression.recent_fraction
        )));
    }

    if compression.compressed_length < 4 {
        errors.push(invalid(format!(
            "storage.compression.compressed_length must be at least 4, got {}",
            compression.compressed_length
        )));
    }

    let q = &config.qualification;
    for (name, list) in [
        ("timeline", &q.timeline),
        ("agent_status", &q.agent_status),
        ("financing", &q.financing),
    ] {
        if list.is_empty() {
            errors.push(invalid(format!(
                "qualification.{name} must list at least one keyword"
            )));
        }
    }

    for (name, list) in [
        ("timeline", &q.timeline),
        ("agent_status", &q.agent_status),
        ("financing", &q.financing),
        ("phone", &q.phone),
        ("scheduling", &q.scheduling),
        ("handoff", &q.handoff),
    ] {
        if let Some(i) = list.iter().position(|k| k.trim().is_empty()) {
            errors.push(invalid(format!("qualification.{name}[{i}] must not be blank")));
        }
    }

    if q.engagement_min_inbound == 0 {
        errors.push(invalid(
            "qualification.engagement_min_inbound must be at least 1".to_string(),
        ));
    }

    if let Some(path) = &config.prompt.template_file {
        if path.trim().is_empty() {
            errors.push(invalid("prompt.template_file must not be empty".to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Validation { message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_error(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        let config = LeadlineConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn ceiling_above_field_capacity_fails() {
        let mut config = LeadlineConfig::default();
        config.storage.ceiling_bytes = 70_000;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "crm_field_capacity"));
    }

    #[test]
    fn tiny_ceiling_fails() {
        let mut config = LeadlineConfig::default();
        config.storage.ceiling_bytes = 100;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "ceiling_bytes must be at least"));
    }

    #[test]
    fn out_of_range_fractions_fail() {
        let mut config = LeadlineConfig::default();
        config.storage.compression.threshold = 0.0;
        config.storage.compression.recent_fraction = 1.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "threshold"));
        assert!(has_error(&errors, "recent_fraction"));
    }

    #[test]
    fn errors_are_collected_not_fail_fast() {
        let mut config = LeadlineConfig::default();
        config.storage.max_messages = 0;
        config.storage.compression.compressed_length = 2;
        config.qualification.financing.clear();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn blank_keyword_fails() {
        let mut config = LeadlineConfig::default();
        config.qualification.phone.push("  ".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_error(&errors, "qualification.phone["));
    }

    #[test]
    fn empty_phone_list_is_allowed() {
        let mut config = LeadlineConfig::default();
        config.qualification.phone.clear();
        config.qualification.scheduling.clear();
        assert!(validate_config(&config).is_ok());
    }
}
