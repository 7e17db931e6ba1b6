// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading and writing exported CRM free-text fields.
//!
//! Commands take a file path, or `-` for stdin/stdout.

use leadline_core::LeadlineError;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub const STDIO: &str = "-";

pub async fn read_blob(input: &str) -> Result<String, LeadlineError> {
    if input == STDIO {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .map_err(|e| LeadlineError::Internal(format!("failed to read stdin: {e}")))?;
        return Ok(buf);
    }
    tokio::fs::read_to_string(input)
        .await
        .map_err(|e| LeadlineError::Internal(format!("failed to read {input}: {e}")))
}

/// Writes `content` back to `input`, or to stdout when `input` is `-`.
pub async fn write_blob(input: &str, content: &str) -> Result<(), LeadlineError> {
    if input == STDIO {
        let mut stdout = tokio::io::stdout();
        let to_err = |e: std::io::Error| LeadlineError::Internal(format!("failed to write stdout: {e}"));
        stdout.write_all(content.as_bytes()).await.map_err(to_err)?;
        stdout.flush().await.map_err(to_err)?;
        return Ok(());
    }
    tokio::fs::write(input, content)
        .await
        .map_err(|e| LeadlineError::Internal(format!("failed to write {input}: {e}")))
}
