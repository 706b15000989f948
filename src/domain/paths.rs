//! # Workspace Paths
//!
//! Maps path strings from a plan onto the filesystem.
//!
//! Relative inputs land under the `app` directory of the workspace root; inputs starting
//! with `/` are taken from the workspace root itself. `.` and `..` are folded lexically and
//! `..` stops at the root. There is no containment check past that: with the default root
//! of `/`, an absolute input can address any host path. The process is expected to run
//! inside an already isolated workspace.

use std::path::PathBuf;

pub const WORKSPACE_ROOT: &str = "/";
pub const APP_DIR: &str = "app";

#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    app_dir: String,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(WORKSPACE_ROOT, APP_DIR)
    }
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>, app_dir: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            app_dir: app_dir.into(),
        }
    }

    /// Resolve a file path from an action. Pure, never fails.
    pub fn resolve(&self, input: &str) -> PathBuf {
        if input.starts_with('/') {
            self.join_lexical(input)
        } else {
            self.join_lexical(&format!("{}/{}", self.app_dir, input))
        }
    }

    /// Resolve a command working directory relative to the root. A leading `app` segment
    /// names the configured app directory, so the default cwd follows `app_dir`.
    pub fn resolve_cwd(&self, input: &str) -> PathBuf {
        match input.strip_prefix(APP_DIR) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => {
                self.join_lexical(&format!("{}{}", self.app_dir, rest))
            }
            _ => self.join_lexical(input),
        }
    }

    fn join_lexical(&self, rel: &str) -> PathBuf {
        let mut segments: Vec<&str> = Vec::new();
        for segment in rel.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s => segments.push(s),
            }
        }

        let mut out = self.root.clone();
        out.extend(segments);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::default()
    }

    #[test]
    fn test_relative_paths_land_under_app() {
        let r = resolver();
        assert_eq!(r.resolve("README.md"), PathBuf::from("/app/README.md"));
        assert_eq!(r.resolve("src/main.js"), PathBuf::from("/app/src/main.js"));
        assert_eq!(r.resolve("./src/./main.js"), PathBuf::from("/app/src/main.js"));
        assert_eq!(r.resolve(""), PathBuf::from("/app"));
    }

    #[test]
    fn test_absolute_paths_resolve_from_root() {
        let r = resolver();
        assert_eq!(r.resolve("/etc/hosts"), PathBuf::from("/etc/hosts"));
        assert_eq!(r.resolve("/app/x"), PathBuf::from("/app/x"));
        assert_eq!(r.resolve("//tmp//a/"), PathBuf::from("/tmp/a"));
    }

    #[test]
    fn test_dot_dot_is_folded_and_clamped() {
        let r = resolver();
        assert_eq!(r.resolve("../etc/passwd"), PathBuf::from("/etc/passwd"));
        assert_eq!(r.resolve("a/b/../c"), PathBuf::from("/app/a/c"));
        assert_eq!(r.resolve("../../../../x"), PathBuf::from("/x"));
        assert_eq!(r.resolve("/.."), PathBuf::from("/"));
    }

    #[test]
    fn test_custom_root() {
        let r = PathResolver::new("/srv/ws", "web");
        assert_eq!(r.resolve("index.html"), PathBuf::from("/srv/ws/web/index.html"));
        assert_eq!(r.resolve("/notes.txt"), PathBuf::from("/srv/ws/notes.txt"));
        assert_eq!(r.resolve("../../../escape"), PathBuf::from("/srv/ws/escape"));
    }

    #[test]
    fn test_cwd_resolves_from_root() {
        let r = resolver();
        assert_eq!(r.resolve_cwd("app"), PathBuf::from("/app"));
        assert_eq!(r.resolve_cwd("/app/client"), PathBuf::from("/app/client"));
        assert_eq!(r.resolve_cwd("."), PathBuf::from("/"));
    }

    #[test]
    fn test_cwd_follows_custom_app_dir() {
        let r = PathResolver::new("/srv/ws", "web");
        assert_eq!(r.resolve_cwd("app"), PathBuf::from("/srv/ws/web"));
        assert_eq!(r.resolve_cwd("app/client"), PathBuf::from("/srv/ws/web/client"));
        assert_eq!(r.resolve_cwd("web"), PathBuf::from("/srv/ws/web"));
        assert_eq!(r.resolve_cwd("apple"), PathBuf::from("/srv/ws/apple"));
        assert_eq!(r.resolve_cwd("/tmp"), PathBuf::from("/srv/ws/tmp"));
        assert_eq!(r.resolve("index.html").parent(), Some(r.resolve_cwd("app").as_path()));
    }
}
