//! Story source resolution: a local file or folder, or a URL to download.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Return the local story path to train on.
///
/// A URL takes precedence over `stories`; its body is written to a uniquely
/// named file in the system temp directory.
pub async fn resolve_stories(stories: &Path, url: Option<&str>) -> Result<PathBuf> {
    match url {
        Some(url) => download_stories(url).await,
        None => Ok(stories.to_path_buf()),
    }
}

async fn download_stories(url: &str) -> Result<PathBuf> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to fetch stories from {}", url))?
        .error_for_status()
        .with_context(|| format!("Story download from {} failed", url))?;
    let body = response
        .text()
        .await
        .context("Failed to read story download body")?;

    let path = std::env::temp_dir().join(format!("stories-{}.md", uuid::Uuid::new_v4()));
    std::fs::write(&path, body)
        .with_context(|| format!("Failed to write downloaded stories to {}", path.display()))?;

    info!(url, path = %path.display(), "downloaded stories");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_path_is_returned_unchanged() {
        let path = resolve_stories(Path::new("data/core"), None).await.unwrap();
        assert_eq!(path, PathBuf::from("data/core"));
    }

    #[tokio::test]
    async fn test_unreachable_url_is_error() {
        let err = resolve_stories(Path::new("data/core"), Some("http://127.0.0.1:9/stories.md"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to fetch stories"));
    }
}
