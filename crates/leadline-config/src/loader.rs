// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./leadline.toml` > `~/.config/leadline/leadline.toml` > `/etc/leadline/leadline.toml`
//! with environment variable overrides via `LEADLINE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::LeadlineConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/leadline/leadline.toml` (system-wide)
/// 3. `~/.config/leadline/leadline.toml` (user XDG config)
/// 4. `./leadline.toml` (local directory)
/// 5. `LEADLINE_*` environment variables
pub fn load_config() -> Result<LeadlineConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<LeadlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadlineConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LeadlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadlineConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Config files consulted by [`load_config`], lowest precedence first.
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/leadline/leadline.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("leadline").join("leadline.toml"));
    }
    paths.push(PathBuf::from("leadline.toml"));
    paths
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    let layered = config_search_paths()
        .into_iter()
        .fold(Figment::new().merge(Serialized::defaults(LeadlineConfig::default())), |fig, path| {
            fig.merge(Toml::file(path))
        });
    layered.merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `LEADLINE_STORAGE_CEILING_BYTES` must map to
/// `storage.ceiling_bytes`, not `storage.ceiling.bytes`.
fn env_provider() -> Env {
    Env::prefixed("LEADLINE_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    // Longest section prefix first: `storage_compression_` before `storage_`.
    const SECTIONS: &[(&str, &str)] = &[
        ("storage_compression_", "storage.compression."),
        ("storage_", "storage."),
        ("agent_", "agent."),
        ("qualification_", "qualification."),
        ("prompt_", "prompt."),
    ];
    for (prefix, dotted) in SECTIONS {
        if let Some(rest) = key.strip_prefix(prefix) {
            return format!("{dotted}{rest}");
        }
    }
    key.to_string()
}
