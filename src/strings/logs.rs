//! Log lines shared by bootstrap and the request path.

use std::path::Path;

pub const STARTING: &str = "Starting workagent...";
pub const FALLBACK_PLAN: &str = "No planning provider configured, using fallback plan";

pub fn config_missing(path: &Path) -> String {
    format!("No config at {}, using defaults", path.display())
}

pub fn planner_selected(name: &str) -> String {
    format!("Planning provider: {name}")
}

pub fn workspace_root(root: &Path, app_dir: &str) -> String {
    format!("Workspace root {} (relative paths under {}/)", root.display(), app_dir)
}

pub fn listening(addr: &str) -> String {
    format!("Agent listening on {addr}")
}
