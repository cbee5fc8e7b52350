//! Exclusion percentages and the story-count summary written after a comparison run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::corpus::CorpusLoader;
use crate::errors::{ConfigurationError, CorpusError, PersistenceError};

/// File name of the summary written under the output root.
pub const NUM_STORIES_FILE: &str = "num_stories.json";

/// Share of the story corpus withheld from a training run, in `[0, 100)`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionPercentage(f64);

impl ExclusionPercentage {
    pub fn new(value: f64) -> Result<Self, ConfigurationError> {
        if (0.0..100.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConfigurationError::PercentageOutOfRange { value })
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Stories left after excluding this share of `total`.
    ///
    /// The excluded count is rounded half-to-even before subtracting, so
    /// `n = 10, p = 25` keeps 8 stories and `n = 10, p = 35` keeps 6.
    pub fn remaining(self, total: usize) -> u64 {
        let excluded = (self.0 / 100.0 * total as f64).round_ties_even();
        total as u64 - excluded as u64
    }
}

impl std::fmt::Display for ExclusionPercentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate a raw list of percentages, keeping order.
pub fn parse_percentages(values: &[f64]) -> Result<Vec<ExclusionPercentage>, ConfigurationError> {
    values.iter().map(|v| ExclusionPercentage::new(*v)).collect()
}

/// Remaining story count for each percentage, in input order.
pub fn exclusion_story_counts(total: usize, percentages: &[ExclusionPercentage]) -> Vec<u64> {
    percentages.iter().map(|p| p.remaining(total)).collect()
}

/// Computes and persists the exclusion-adjusted story counts.
pub struct ExclusionStoryCounter<'a> {
    loader: &'a dyn CorpusLoader,
}

impl<'a> ExclusionStoryCounter<'a> {
    pub fn new(loader: &'a dyn CorpusLoader) -> Self {
        Self { loader }
    }

    /// Load the corpus once and derive one count per percentage.
    pub fn compute(
        &self,
        stories: &Path,
        domain: &Path,
        percentages: &[ExclusionPercentage],
    ) -> Result<Vec<u64>, CorpusError> {
        let corpus = self.loader.load(stories, domain)?;
        Ok(exclusion_story_counts(corpus.size(), percentages))
    }

    /// Write `counts` to `output_root/num_stories.json`.
    ///
    /// The array is written to a temporary sibling first and renamed, so the
    /// final file is either absent or complete.
    pub fn persist(&self, output_root: &Path, counts: &[u64]) -> Result<PathBuf, PersistenceError> {
        let path = output_root.join(NUM_STORIES_FILE);
        let tmp = output_root.join(format!(".{NUM_STORIES_FILE}.tmp"));
        let json = serde_json::to_string(counts).map_err(PersistenceError::Serialize)?;

        std::fs::create_dir_all(output_root).map_err(|e| PersistenceError::Write {
            path: output_root.to_path_buf(),
            source: e,
        })?;
        std::fs::write(&tmp, json).map_err(|e| PersistenceError::Write {
            path: tmp.clone(),
            source: e,
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| PersistenceError::Write {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), counts = ?counts, "wrote story counts");
        Ok(path)
    }
}
