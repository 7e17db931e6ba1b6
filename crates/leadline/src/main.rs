// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Leadline - operator tooling for the SMS lead assistant.
//!
//! Works on exported CRM free-text fields: inspect a transcript, re-run
//! qualification, compact or reset it, and preview the reply prompt.

mod blob;
mod inspect;
mod maintain;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use leadline_config::model::LeadlineConfig;
use leadline_core::LeadlineError;

/// Leadline - operator tooling for the SMS lead assistant.
#[derive(Parser, Debug)]
#[command(name = "leadline", version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the default lookup.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands. FILE is an exported free-text field, or `-` for stdin.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show transcript size, utilization and messages.
    Inspect {
        file: String,
        /// Print structured JSON.
        #[arg(long)]
        json: bool,
    },
    /// Re-run qualification over the stored transcript.
    Qualify {
        file: String,
        /// Report signals without escalating, as dev mode does.
        #[arg(long)]
        bypass: bool,
    },
    /// Apply the compression and ceiling policy to a field.
    Compact {
        file: String,
        /// Rewrite FILE instead of printing the result.
        #[arg(long)]
        write: bool,
    },
    /// Empty the transcript, keeping operator notes.
    Reset {
        file: String,
        #[arg(long)]
        write: bool,
    },
    /// Preview the reply prompt for a new inbound message.
    Render {
        file: String,
        #[arg(long)]
        message: String,
        #[arg(long)]
        lead_name: Option<String>,
    },
    /// Validate configuration and print the effective values.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match cli.config {
        Some(ref path) => leadline_config::load_and_validate_path(path),
        None => leadline_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            leadline_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    if let Err(e) = run(cli.command, &config).await {
        eprintln!("leadline: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &LeadlineConfig) -> Result<(), LeadlineError> {
    match command {
        Commands::Inspect { file, json } => inspect::run_inspect(config, &file, json).await,
        Commands::Qualify { file, bypass } => inspect::run_qualify(config, &file, bypass).await,
        Commands::Compact { file, write } => maintain::run_compact(config, &file, write).await,
        Commands::Reset { file, write } => maintain::run_reset(config, &file, write).await,
        Commands::Render {
            file,
            message,
            lead_name,
        } => render::run_render(config, &file, &message, lead_name.as_deref()).await,
        Commands::Config => {
            // The template is parsed here too so a bad placeholder fails the check.
            leadline_context::load_template_strict(&config.prompt).await?;
            let rendered = toml::to_string_pretty(config)
                .map_err(|e| LeadlineError::Config(format!("failed to render config: {e}")))?;
            print!("{rendered}");
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with the configured log level.
///
/// `RUST_LOG` overrides the config value.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("leadline={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_config_flag() {
        let cli = Cli::try_parse_from([
            "leadline", "qualify", "field.txt", "--bypass", "--config", "alt.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        assert!(matches!(cli.command, Commands::Qualify { bypass: true, .. }));
    }

    #[test]
    fn render_requires_message() {
        assert!(Cli::try_parse_from(["leadline", "render", "-"]).is_err());
        let cli = Cli::try_parse_from([
            "leadline", "render", "-", "--message", "hi", "--lead-name", "Jo",
        ])
        .unwrap();
        match cli.command {
            Commands::Render { file, message, lead_name } => {
                assert_eq!(file, "-");
                assert_eq!(message, "hi");
                assert_eq!(lead_name.as_deref(), Some("Jo"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
