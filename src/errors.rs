//! Typed error hierarchy for dialogue training.
//!
//! Four leaf enums map to the four failure domains:
//! - `ConfigurationError`: invariant violations caught before expensive work
//! - `TrainingError`: failures raised by a single training job
//! - `PersistenceError`: writing the story-count summary
//! - `CorpusError`: reading stories or the domain
//!
//! `CompareError` wraps all of them for the comparison flow.

use std::path::PathBuf;
use thiserror::Error;

/// Invariant violations detected before any training starts. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(
        "exactly one policy required for comparison, but {path} defines {count} policies"
    )]
    NotSinglePolicy { path: PathBuf, count: usize },

    #[error("core and finetune are mutually exclusive")]
    CoreWithFinetune,

    #[error("Exclusion percentage {value} is outside [0, 100)")]
    PercentageOutOfRange { value: f64 },

    #[error("Run count must be at least 1")]
    ZeroRuns,

    #[error("No policy configuration given")]
    NoPolicyConfig,

    #[error("Policy `{raw}` in {path} has no class name")]
    UnnamedPolicy { path: PathBuf, raw: String },

    #[error("Failed to read policy config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse policy config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Failures from a single training job.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("No trainer command configured")]
    MissingCommand,

    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn trainer `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to send training request to trainer: {0}")]
    Request(String),

    #[error("Trainer exited with code {exit_code} for {output}: {stderr}")]
    NonZeroExit {
        output: PathBuf,
        exit_code: i32,
        stderr: String,
    },
}

/// Failures writing `num_stories.json`.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize story counts: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures loading the story corpus or the domain it is interpreted against.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Story source {0} does not exist")]
    MissingStories(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk story folder {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to parse domain {path}: {source}")]
    DomainParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Domain {0} is not a mapping")]
    DomainShape(PathBuf),
}

/// Errors from the comparison flow (grid plus story-count summary).
#[derive(Debug, Error)]
pub enum CompareError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Training(#[from] TrainingError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Corpus(#[from] CorpusError),
}
