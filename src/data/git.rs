use std::path::Path;

use crate::config::UNKNOWN_REPO;
use crate::data::process_runner::CommandRunner;

/// Resolve a directory to the name of the repository containing it, via
/// `git rev-parse --show-toplevel`. Returns `"Unknown"` if git fails or the
/// directory isn't inside a work tree.
pub fn repo_name_for_dir(runner: &dyn CommandRunner, dir: &str) -> String {
    let toplevel = match runner.output("git", &["-C", dir, "rev-parse", "--show-toplevel"]) {
        Ok(out) => out.trim().to_string(),
        Err(e) => {
            tracing::debug!("no git toplevel for {}: {}", dir, e);
            return UNKNOWN_REPO.to_string();
        }
    };

    // A toplevel of `/` has no file name and is reported as unknown.
    Path::new(&toplevel)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_REPO.to_string())
}
