//! Publishing an article: git add/commit/push in the blog repository.

use crate::config::PublisherConfig;
use crate::error::{AutoblogError, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

pub trait Publisher {
    /// Commit and push `path` with a message derived from `title`.
    fn publish(&self, path: &Path, title: &str) -> Result<()>;
}

/// Public URL of an article with the given slug.
pub fn article_url(config: &PublisherConfig, slug: &str) -> String {
    format!("{}/{}", config.article_url_base.trim_end_matches('/'), slug)
}

/// Slug of a saved article file (its file stem).
pub fn slug_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub struct GitPublisher {
    repo_dir: PathBuf,
    remote: String,
    branch: String,
    commit_prefix: String,
}

impl GitPublisher {
    pub fn new(repo_dir: &Path, config: &PublisherConfig) -> Self {
        Self {
            repo_dir: repo_dir.to_path_buf(),
            remote: config.remote.clone(),
            branch: config.branch.clone(),
            commit_prefix: config.commit_prefix.clone(),
        }
    }

    pub fn commit_message(&self, title: &str) -> String {
        if self.commit_prefix.is_empty() {
            title.to_string()
        } else {
            format!("{} {}", self.commit_prefix, title)
        }
    }

    fn git(&self, step: &'static str, args: &[&str]) -> Result<()> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .map_err(|e| AutoblogError::Git {
                step,
                stderr: e.to_string(),
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AutoblogError::Git { step, stderr });
        }
        Ok(())
    }
}

impl Publisher for GitPublisher {
    fn publish(&self, path: &Path, title: &str) -> Result<()> {
        which::which("git").map_err(|_| AutoblogError::GitNotFound)?;

        let file = path.to_string_lossy();
        let message = self.commit_message(title);
        self.git("add", &["add", &file])?;
        self.git("commit", &["commit", "-m", &message])?;
        self.git("push", &["push", &self.remote, &self.branch])?;

        tracing::info!(file = %path.display(), remote = %self.remote, branch = %self.branch, "article pushed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
