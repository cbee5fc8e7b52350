use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::extra_args::ExtraArgs;
use crate::settings::{SETTINGS_FILE, TrainToml};

/// Command-line overrides applied on top of train.toml and the environment.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub settings: Option<PathBuf>,
    pub trainer_cmd: Option<String>,
    pub interactive_cmd: Option<String>,
    pub augmentation: Option<u32>,
    pub debug_plots: bool,
}

/// Runtime configuration for a training invocation.
///
/// Values resolve CLI → environment → train.toml → built-in default.
#[derive(Debug, Clone)]
pub struct Config {
    pub working_dir: PathBuf,
    pub settings_file: PathBuf,
    pub toml: TrainToml,
    overrides: CliOverrides,
}

impl Config {
    pub fn new(working_dir: PathBuf, overrides: CliOverrides) -> Result<Self> {
        let working_dir = working_dir
            .canonicalize()
            .context("Failed to resolve working directory")?;

        let settings_file = match &overrides.settings {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Settings file not found: {}", path.display());
                }
                path.clone()
            }
            None => working_dir.join(SETTINGS_FILE),
        };
        let toml = TrainToml::load_or_default(&settings_file)?;

        Ok(Self {
            working_dir,
            settings_file,
            toml,
            overrides,
        })
    }

    pub fn trainer_cmd(&self) -> String {
        self.overrides
            .trainer_cmd
            .clone()
            .or_else(|| self.toml.trainer_cmd())
            .unwrap_or_default()
    }

    pub fn interactive_cmd(&self) -> String {
        self.overrides
            .interactive_cmd
            .clone()
            .or_else(|| self.toml.interactive_cmd())
            .unwrap_or_default()
    }

    /// Extra training arguments. Both keys are always present.
    pub fn extra_args(&self) -> ExtraArgs {
        let augmentation = self
            .overrides
            .augmentation
            .unwrap_or(self.toml.defaults.augmentation_factor);
        let debug_plots = self.overrides.debug_plots || self.toml.defaults.debug_plots;
        ExtraArgs::from_cli(Some(augmentation), Some(debug_plots))
    }

    /// Resolve `path` against the working directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }

    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_settings_file() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path().to_path_buf(), CliOverrides::default()).unwrap();
        assert_eq!(
            config.settings_file,
            dir.path().canonicalize().unwrap().join(SETTINGS_FILE)
        );
        let args = config.extra_args();
        assert_eq!(args.get("augmentation_factor"), Some(&json!(50)));
        assert_eq!(args.get("debug_plots"), Some(&json!(false)));
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            "[trainer]\ncommand = \"from-file\"\n[defaults]\naugmentation_factor = 10\n",
        )
        .unwrap();

        let config = Config::new(
            dir.path().to_path_buf(),
            CliOverrides {
                trainer_cmd: Some("from-cli".to_string()),
                augmentation: Some(30),
                debug_plots: true,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(config.trainer_cmd(), "from-cli");
        let args = config.extra_args();
        assert_eq!(args.get("augmentation_factor"), Some(&json!(30)));
        assert_eq!(args.get("debug_plots"), Some(&json!(true)));
    }

    #[test]
    fn test_file_defaults_apply_without_cli() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            "[interactive]\ncommand = \"./interactive.sh\"\n[defaults]\naugmentation_factor = 10\n",
        )
        .unwrap();

        let config = Config::new(dir.path().to_path_buf(), CliOverrides::default()).unwrap();
        assert_eq!(config.toml.interactive.command.as_deref(), Some("./interactive.sh"));
        assert_eq!(config.extra_args().get("augmentation_factor"), Some(&json!(10)));
    }

    #[test]
    fn test_explicit_settings_must_exist() {
        let dir = tempdir().unwrap();
        let result = Config::new(
            dir.path().to_path_buf(),
            CliOverrides {
                settings: Some(dir.path().join("missing.toml")),
                ..Default::default()
            },
        );
        assert!(result.unwrap_err().to_string().contains("Settings file not found"));
    }

    #[test]
    fn test_resolve_relative_paths() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path().to_path_buf(), CliOverrides::default()).unwrap();
        assert_eq!(
            config.resolve(Path::new("domain.yml")),
            config.working_dir.join("domain.yml")
        );
        assert_eq!(config.resolve(Path::new("/abs/domain.yml")), PathBuf::from("/abs/domain.yml"));
    }
}
