// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Leadline settings: storage bounds, qualification keywords, persona and
//! prompt template source.
//!
//! Settings come from compiled defaults, then the `leadline.toml` files
//! listed by [`loader::config_search_paths`], then `LEADLINE_*` variables.
//! Every table rejects unknown keys, and all problems found in one load are
//! returned together so the CLI can print them in a single pass.
//!
//! ```no_run
//! let config = leadline_config::load_and_validate().unwrap_or_else(|errors| {
//!     leadline_config::render_errors(&errors);
//!     std::process::exit(1);
//! });
//! assert!(config.storage.ceiling_bytes > 0);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, SourceFiles, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::LeadlineConfig;

/// Loads from the standard file hierarchy plus environment and validates.
pub fn load_and_validate() -> Result<LeadlineConfig, Vec<ConfigError>> {
    finish(loader::load_config(), searched_sources)
}

/// Loads one explicit file plus environment and validates.
pub fn load_and_validate_path(path: &Path) -> Result<LeadlineConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        let mut sources = SourceFiles::new();
        if let Ok(text) = std::fs::read_to_string(path) {
            sources.add(path.display().to_string(), text);
        }
        sources
    })
}

/// Loads an in-memory TOML document, without environment overrides.
pub fn load_and_validate_str(toml_content: &str) -> Result<LeadlineConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        let mut sources = SourceFiles::new();
        sources.add("<inline>", toml_content);
        sources
    })
}

/// Validates a successful extraction, or converts the figment failure into
/// diagnostics. Sources are only read back from disk on failure.
fn finish(
    extracted: Result<LeadlineConfig, figment::Error>,
    sources: impl FnOnce() -> SourceFiles,
) -> Result<LeadlineConfig, Vec<ConfigError>> {
    let config = extracted.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Text of every config file in the search hierarchy that exists.
fn searched_sources() -> SourceFiles {
    let mut sources = SourceFiles::new();
    for path in loader::config_search_paths() {
        let Ok(text) = std::fs::read_to_string(&path) else {
            continue;
        };
        // Figment reports relative files by their resolved location.
        let name = std::fs::canonicalize(&path).unwrap_or(path);
        sources.add(name.display().to_string(), text);
    }
    sources
}
