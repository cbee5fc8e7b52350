//! Story corpus loading.
//!
//! Stories use the Markdown training format: a `## name` header followed by
//! user turns (`* intent`) and bot actions (`- action`). Checkpoint lines
//! (`> name`) and HTML comments are not steps. A header with no steps is not
//! counted as a story.

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::errors::CorpusError;

/// Parsed story corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    /// Story names in file order
    pub stories: Vec<String>,
}

impl Corpus {
    pub fn size(&self) -> usize {
        self.stories.len()
    }
}

/// Loads the story corpus for a domain.
pub trait CorpusLoader: Send + Sync {
    fn load(&self, stories: &Path, domain: &Path) -> Result<Corpus, CorpusError>;
}

/// Reads Markdown story files from a single file or a folder tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownStoryLoader;

impl CorpusLoader for MarkdownStoryLoader {
    fn load(&self, stories: &Path, domain: &Path) -> Result<Corpus, CorpusError> {
        check_domain(domain)?;

        let mut corpus = Corpus::default();
        for file in story_files(stories)? {
            let content = std::fs::read_to_string(&file).map_err(|e| CorpusError::Read {
                path: file.clone(),
                source: e,
            })?;
            let found = parse_story_names(&content);
            debug!(file = %file.display(), stories = found.len(), "parsed story file");
            corpus.stories.extend(found);
        }
        Ok(corpus)
    }
}

/// Domain must be a YAML mapping; its contents are the trainer's concern.
fn check_domain(domain: &Path) -> Result<(), CorpusError> {
    let content = std::fs::read_to_string(domain).map_err(|e| CorpusError::Read {
        path: domain.to_path_buf(),
        source: e,
    })?;
    let value: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| CorpusError::DomainParse {
            path: domain.to_path_buf(),
            source: e,
        })?;
    if value.is_mapping() {
        Ok(())
    } else {
        Err(CorpusError::DomainShape(domain.to_path_buf()))
    }
}

/// Collect `.md` files under `root` in sorted order, or `root` itself if it is a file.
fn story_files(root: &Path) -> Result<Vec<PathBuf>, CorpusError> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.is_dir() {
        return Err(CorpusError::MissingStories(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| CorpusError::Walk {
            path: root.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "md") {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// Return the names of stories in `content` that contain at least one step.
pub fn parse_story_names(content: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut current: Option<(String, bool)> = None;
    let mut in_comment = false;

    for raw in content.lines() {
        let line = raw.trim();

        if in_comment {
            if line.contains("-->") {
                in_comment = false;
            }
            continue;
        }
        if line.starts_with("<!--") {
            in_comment = !line.contains("-->");
            continue;
        }

        if let Some(name) = line.strip_prefix("##") {
            if let Some((name, true)) = current.take() {
                names.push(name);
            }
            current = Some((name.trim().to_string(), false));
        } else if line.starts_with('*') || line.starts_with('-') {
            if let Some((_, has_steps)) = current.as_mut() {
                *has_steps = true;
            }
        }
    }

    if let Some((name, true)) = current {
        names.push(name);
    }
    names
}
