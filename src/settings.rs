//! `train.toml` settings file.
//!
//! ```toml
//! [trainer]
//! command = "python -m train_single"
//!
//! [interactive]
//! command = "python -m interactive"
//!
//! [defaults]
//! augmentation_factor = 50
//! debug_plots = false
//! ```
//!
//! Every section is optional. Environment variables override the file
//! (`TRAINER_CMD`, `INTERACTIVE_CMD`) and CLI flags override both; see
//! [`crate::config::Config`].

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Default settings file name, looked up in the working directory.
pub const SETTINGS_FILE: &str = "train.toml";

/// External training command.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainerSection {
    #[serde(default)]
    pub command: Option<String>,
}

/// External interactive-learning command.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractiveSection {
    #[serde(default)]
    pub command: Option<String>,
}

/// Defaults for extra training arguments.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsSection {
    /// How many stories to glue together when augmenting training data
    #[serde(default = "default_augmentation_factor")]
    pub augmentation_factor: u32,
    #[serde(default)]
    pub debug_plots: bool,
}

fn default_augmentation_factor() -> u32 {
    50
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            augmentation_factor: default_augmentation_factor(),
            debug_plots: false,
        }
    }
}

/// The complete train.toml structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainToml {
    #[serde(default)]
    pub trainer: TrainerSection,
    #[serde(default)]
    pub interactive: InteractiveSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
}

impl TrainToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse train.toml")
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Trainer command (env → file).
    pub fn trainer_cmd(&self) -> Option<String> {
        std::env::var("TRAINER_CMD")
            .ok()
            .or_else(|| self.trainer.command.clone())
    }

    /// Interactive command (env → file).
    pub fn interactive_cmd(&self) -> Option<String> {
        std::env::var("INTERACTIVE_CMD")
            .ok()
            .or_else(|| self.interactive.command.clone())
    }

    /// Validate the settings and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(cmd) = &self.trainer.command
            && cmd.trim().is_empty()
        {
            warnings.push("[trainer] command is empty".to_string());
        }
        if let Some(cmd) = &self.interactive.command
            && cmd.trim().is_empty()
        {
            warnings.push("[interactive] command is empty".to_string());
        }
        if self.defaults.augmentation_factor == 0 {
            warnings.push("[defaults] augmentation_factor = 0 disables augmentation".to_string());
        }

        warnings
    }
}
