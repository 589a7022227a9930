use crate::error::{AutoblogError, Result};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File names
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "autoblog.yaml";
pub const ENV_FILE: &str = ".env";

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_ARTICLES_DIR: &str = "articles";

pub const TOPICS_FILE: &str = "topics.json";
pub const POSTED_TOPICS_FILE: &str = "posted_topics.json";
pub const TWEET_RECORDS_FILE: &str = "tweet_records.json";

pub const CLAUDE_DIR: &str = ".claude";
pub const CLAUDE_HISTORY_FILE: &str = "history.jsonl";
pub const CLAUDE_STATS_FILE: &str = "stats-cache.json";
pub const ZSH_HISTORY_FILE: &str = ".zsh_history";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn env_path(root: &Path) -> PathBuf {
    root.join(ENV_FILE)
}

pub fn topics_path(data_dir: &Path) -> PathBuf {
    data_dir.join(TOPICS_FILE)
}

pub fn posted_topics_path(data_dir: &Path) -> PathBuf {
    data_dir.join(POSTED_TOPICS_FILE)
}

pub fn tweet_records_path(data_dir: &Path) -> PathBuf {
    data_dir.join(TWEET_RECORDS_FILE)
}

pub fn article_path(articles_dir: &Path, slug: &str) -> PathBuf {
    articles_dir.join(format!("{slug}.md"))
}

/// Resolve `path` against `root` unless it is already absolute.
pub fn under_root(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => {
            let home = home::home_dir().ok_or(AutoblogError::HomeNotFound)?;
            Ok(home.join(rest))
        }
        Err(_) => Ok(path.to_path_buf()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
