//! Interactive learning hand-off.
//!
//! The dispatcher owns no session state. It rejects conflicting flags and then
//! passes everything through to an [`InteractiveSession`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::info;

use crate::errors::ConfigurationError;
use crate::extra_args::ExtraArgs;

/// Flags recognised by interactive mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InteractiveFlags {
    /// Train only the dialogue core model
    pub core: bool,
    /// Keep training an existing model
    pub finetune: bool,
    pub skip_visualization: bool,
}

/// Everything forwarded to the session collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractiveRequest {
    pub stories: PathBuf,
    #[serde(flatten)]
    pub flags: InteractiveFlags,
    pub extra_args: ExtraArgs,
    /// Remaining command-line settings, passed through untouched
    pub server_args: BTreeMap<String, Value>,
}

#[async_trait]
pub trait InteractiveSession: Send + Sync {
    async fn run_session(&self, request: &InteractiveRequest) -> Result<()>;
}

/// Reject flag combinations interactive mode cannot honour.
pub fn validate_flags(flags: &InteractiveFlags) -> Result<(), ConfigurationError> {
    if flags.core && flags.finetune {
        return Err(ConfigurationError::CoreWithFinetune);
    }
    Ok(())
}

/// Validate `request.flags` and hand the request to `session`.
pub async fn dispatch(session: &dyn InteractiveSession, request: &InteractiveRequest) -> Result<()> {
    validate_flags(&request.flags)?;
    info!(
        stories = %request.stories.display(),
        finetune = request.flags.finetune,
        "starting interactive learning"
    );
    session.run_session(request).await
}

/// Runs an external interactive-learning command attached to the terminal.
///
/// The request is passed as JSON in `INTERACTIVE_REQUEST`.
pub struct CommandSession {
    command: String,
    working_dir: PathBuf,
}

impl CommandSession {
    pub fn new(command: impl Into<String>, working_dir: impl AsRef<Path>) -> Self {
        Self {
            command: command.into(),
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl InteractiveSession for CommandSession {
    async fn run_session(&self, request: &InteractiveRequest) -> Result<()> {
        if self.command.trim().is_empty() {
            anyhow::bail!("No interactive command configured. Set INTERACTIVE_CMD or [interactive] command in train.toml");
        }

        let payload =
            serde_json::to_string(request).context("Failed to serialize interactive request")?;

        let status = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .current_dir(&self.working_dir)
            .env("INTERACTIVE_REQUEST", payload)
            .status()
            .await
            .with_context(|| format!("Failed to spawn interactive command: {}", self.command))?;

        if !status.success() {
            anyhow::bail!(
                "Interactive session exited with code {}",
                status.code().unwrap_or(-1)
            );
        }
        Ok(())
    }
}
