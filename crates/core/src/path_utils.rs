//! Path utilities
//!
//! Handles tilde expansion and resolution of command paths against a base directory.

use std::path::{Path, PathBuf};

/// Expands tilde (~) in paths to the user's home directory.
/// Examples:
/// "~/notes.txt" -> "/home/user/notes.txt"
/// "/tmp/foo" -> "/tmp/foo" (no change)
pub fn expand_tilde(path: &str) -> String {
    if path == "~" {
        return std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    }

    if path.starts_with("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        return path.replacen('~', &home, 1);
    }

    path.to_string()
}

/// Helper to convert a potentially tilde-containing string into a PathBuf.
pub fn get_path(path: &str) -> PathBuf {
    PathBuf::from(expand_tilde(path))
}

/// Resolves a path taken from a command: absolute and `~` paths stand alone,
/// anything else is joined onto `base`.
pub fn resolve(base: &Path, raw: &str) -> PathBuf {
    let p = get_path(raw);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_untouched() {
        assert_eq!(expand_tilde("/tmp/foo"), "/tmp/foo");
        assert_eq!(expand_tilde("foo/~bar"), "foo/~bar");
    }

    #[test]
    fn relative_paths_join_the_base() {
        let base = Path::new("/srv/work");
        assert_eq!(resolve(base, "a.txt"), PathBuf::from("/srv/work/a.txt"));
        assert_eq!(resolve(base, "sub/b.txt"), PathBuf::from("/srv/work/sub/b.txt"));
    }

    #[test]
    fn absolute_paths_ignore_the_base() {
        let base = Path::new("/srv/work");
        assert_eq!(resolve(base, "/etc/x.txt"), PathBuf::from("/etc/x.txt"));
    }
}
