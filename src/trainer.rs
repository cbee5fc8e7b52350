//! Single training job execution.
//!
//! The orchestrator only knows the [`Trainer`] trait. [`CommandTrainer`] runs
//! an external training command per job:
//! - creates the output directory
//! - spawns `sh -c <command>` with the request as JSON on stdin
//! - exposes the key fields as `TRAIN_*` environment variables
//! - maps a non-zero exit to [`TrainingError::NonZeroExit`]

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::TrainingError;
use crate::exclusion::ExclusionPercentage;
use crate::extra_args::ExtraArgs;

/// Everything a trainer needs for one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingRequest {
    pub domain: PathBuf,
    pub stories: PathBuf,
    pub output: PathBuf,
    pub policy_config: PathBuf,
    /// `None` for default training, which uses every story
    pub exclusion_percentage: Option<ExclusionPercentage>,
    pub dump_stories: bool,
    pub extra_args: ExtraArgs,
}

/// Result of a successful training job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainedArtifact {
    pub path: PathBuf,
}

#[async_trait]
pub trait Trainer: Send + Sync {
    async fn train(&self, request: &TrainingRequest) -> Result<TrainedArtifact, TrainingError>;
}

/// Payload sent to the training command on stdin.
#[derive(Debug, Serialize)]
struct TrainerPayload<'a> {
    #[serde(flatten)]
    request: &'a TrainingRequest,
    data_load_args: ExtraArgs,
    train_args: ExtraArgs,
}

/// Runs an external command once per training job.
pub struct CommandTrainer {
    command: String,
    working_dir: PathBuf,
}

impl CommandTrainer {
    pub fn new(command: impl Into<String>, working_dir: impl AsRef<Path>) -> Self {
        Self {
            command: command.into(),
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Trainer for CommandTrainer {
    async fn train(&self, request: &TrainingRequest) -> Result<TrainedArtifact, TrainingError> {
        if self.command.trim().is_empty() {
            return Err(TrainingError::MissingCommand);
        }

        std::fs::create_dir_all(&request.output).map_err(|e| TrainingError::OutputDir {
            path: request.output.clone(),
            source: e,
        })?;

        let (data_load_args, train_args) = request.extra_args.split_data_load_args();
        let payload = serde_json::to_string(&TrainerPayload {
            request,
            data_load_args,
            train_args,
        })
        .map_err(|e| TrainingError::Request(e.to_string()))?;

        debug!(command = %self.command, output = %request.output.display(), "spawning trainer");

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .current_dir(&self.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .env("TRAIN_DOMAIN", &request.domain)
            .env("TRAIN_STORIES", &request.stories)
            .env("TRAIN_OUTPUT", &request.output)
            .env("TRAIN_POLICY_CONFIG", &request.policy_config)
            .env(
                "TRAIN_EXCLUSION_PERCENTAGE",
                request
                    .exclusion_percentage
                    .map(|p| p.to_string())
                    .unwrap_or_default(),
            )
            .env("TRAIN_DUMP_STORIES", request.dump_stories.to_string())
            .spawn()
            .map_err(|e| TrainingError::Spawn {
                command: self.command.clone(),
                source: e,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A trainer that ignores stdin may close it early
            if let Err(e) = stdin.write_all(payload.as_bytes()).await
                && e.kind() != std::io::ErrorKind::BrokenPipe
            {
                return Err(TrainingError::Request(e.to_string()));
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| TrainingError::Spawn {
                command: self.command.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(TrainingError::NonZeroExit {
                output: request.output.clone(),
                exit_code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        info!(output = %request.output.display(), "training finished");
        Ok(TrainedArtifact {
            path: request.output.clone(),
        })
    }
}
