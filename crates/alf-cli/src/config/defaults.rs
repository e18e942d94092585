use std::path::{Path, PathBuf};

/// Configuration file picked up from the working directory when `run` is
/// given no `--config`.
pub const CONFIG_FILE_NAME: &str = "alfkit.toml";

pub fn discover(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}
