use autoblog_core::paths;
use std::path::{Path, PathBuf};

/// Resolve the blog repository root.
///
/// Priority:
/// 1. `--root` flag / `AUTOBLOG_ROOT` env var (passed in as `explicit`)
/// 2. Nearest ancestor of `start` containing `autoblog.yaml`
/// 3. Nearest ancestor of `start` containing `.git/`
/// 4. `start` itself
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_from(&cwd)
}

fn resolve_from(start: &Path) -> PathBuf {
    find_upward(start, |dir| paths::config_path(dir).is_file())
        .or_else(|| find_upward(start, |dir| dir.join(".git").is_dir()))
        .unwrap_or_else(|| start.to_path_buf())
}

fn find_upward(start: &Path, found: impl Fn(&Path) -> bool) -> Option<PathBuf> {
    start.ancestors().find(|dir| found(dir)).map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        let result = resolve_root(Some(dir.path()));
        assert_eq!(result, dir.path());
    }

    #[test]
    fn config_file_beats_git_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let blog = dir.path().join("blog");
        std::fs::create_dir_all(blog.join("articles")).unwrap();
        std::fs::write(blog.join("autoblog.yaml"), "").unwrap();

        assert_eq!(resolve_from(&blog.join("articles")), blog);
    }

    #[test]
    fn falls_back_to_git_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let deep = dir.path().join("src/deep");
        std::fs::create_dir_all(&deep).unwrap();

        assert_eq!(resolve_from(&deep), dir.path());
    }
}
