//! Policy configuration model and loading.
//!
//! A policy configuration file lists the policies used to train one model:
//!
//! ```yaml
//! policies:
//!   - name: KerasPolicy
//!     epochs: 100
//!   - name: MemoizationPolicy
//!     max_history: 5
//! ```
//!
//! Each entry's `name` is parsed into a [`PolicyKind`] at load time, so the
//! directory name used for comparison runs never depends on the file name.

pub mod validator;

pub use validator::validate_single_policy;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::ConfigurationError;

/// Kind tag of a single policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    Memoization,
    AugmentedMemoization,
    Keras,
    Embedding,
    Sklearn,
    Fallback,
    TwoStageFallback,
    Form,
    Mapping,
    /// User-supplied policy referenced by its (possibly dotted) import path.
    Custom(String),
}

impl PolicyKind {
    /// Name used for output directories, e.g. `KerasPolicy` or the class
    /// name of a custom policy path.
    pub fn name(&self) -> &str {
        match self {
            PolicyKind::Memoization => "MemoizationPolicy",
            PolicyKind::AugmentedMemoization => "AugmentedMemoizationPolicy",
            PolicyKind::Keras => "KerasPolicy",
            PolicyKind::Embedding => "EmbeddingPolicy",
            PolicyKind::Sklearn => "SklearnPolicy",
            PolicyKind::Fallback => "FallbackPolicy",
            PolicyKind::TwoStageFallback => "TwoStageFallbackPolicy",
            PolicyKind::Form => "FormPolicy",
            PolicyKind::Mapping => "MappingPolicy",
            PolicyKind::Custom(path) => path.rsplit('.').next().unwrap_or(path),
        }
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for PolicyKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "MemoizationPolicy" => PolicyKind::Memoization,
            "AugmentedMemoizationPolicy" => PolicyKind::AugmentedMemoization,
            "KerasPolicy" => PolicyKind::Keras,
            "EmbeddingPolicy" => PolicyKind::Embedding,
            "SklearnPolicy" => PolicyKind::Sklearn,
            "FallbackPolicy" => PolicyKind::Fallback,
            "TwoStageFallbackPolicy" => PolicyKind::TwoStageFallback,
            "FormPolicy" => PolicyKind::Form,
            "MappingPolicy" => PolicyKind::Mapping,
            other => PolicyKind::Custom(other.to_string()),
        })
    }
}

impl<'de> Deserialize<'de> for PolicyKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.parse() {
            Ok(kind) => Ok(kind),
            Err(never) => match never {},
        }
    }
}

/// One entry in a policy configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PolicySpec {
    #[serde(rename = "name")]
    pub kind: PolicyKind,
    /// Remaining keys, passed through to the trainer untouched
    #[serde(flatten)]
    pub params: BTreeMap<String, serde_yaml::Value>,
}

impl PolicySpec {
    pub fn new(kind: PolicyKind) -> Self {
        Self {
            kind,
            params: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PolicyFile {
    #[serde(default)]
    policies: Vec<PolicySpec>,
}

/// Ordered list of policies loaded from one configuration source.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyConfiguration {
    pub source: PathBuf,
    pub policies: Vec<PolicySpec>,
}

impl PolicyConfiguration {
    pub fn new(source: impl Into<PathBuf>, policies: Vec<PolicySpec>) -> Self {
        Self {
            source: source.into(),
            policies,
        }
    }

    /// Parse a configuration from YAML (or JSON) text.
    pub fn parse(source: &Path, content: &str) -> Result<Self, ConfigurationError> {
        let file: PolicyFile =
            serde_yaml::from_str(content).map_err(|e| ConfigurationError::ConfigParse {
                path: source.to_path_buf(),
                source: e,
            })?;
        // The class name becomes the output directory name and must be non-empty
        let unnamed = file.policies.iter().find_map(|p| match &p.kind {
            PolicyKind::Custom(raw) if p.kind.name().is_empty() => Some(raw.clone()),
            _ => None,
        });
        if let Some(raw) = unnamed {
            return Err(ConfigurationError::UnnamedPolicy {
                path: source.to_path_buf(),
                raw,
            });
        }
        Ok(Self::new(source, file.policies))
    }
}

/// Loads a [`PolicyConfiguration`] from a config reference.
pub trait PolicyConfigLoader: Send + Sync {
    fn load(&self, config_ref: &Path) -> Result<PolicyConfiguration, ConfigurationError>;
}

/// Reads policy configurations from YAML or JSON files on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlPolicyLoader;

impl PolicyConfigLoader for YamlPolicyLoader {
    fn load(&self, config_ref: &Path) -> Result<PolicyConfiguration, ConfigurationError> {
        let content =
            std::fs::read_to_string(config_ref).map_err(|e| ConfigurationError::ConfigRead {
                path: config_ref.to_path_buf(),
                source: e,
            })?;
        PolicyConfiguration::parse(config_ref, &content)
    }
}
