//! Where gitrag stores its own data (config, cache).
//!
//! Cloned repositories never land here; they live in per-call temp directories.

use std::path::PathBuf;

/// Returns the directory where gitrag stores its config.
/// On Linux: `~/.local/share/gitrag/`.
/// Creates the directory if it doesn't exist; returns `None` if we can't determine the path.
pub fn app_data_dir() -> Option<PathBuf> {
    let dir = directories::ProjectDirs::from("dev", "gitrag", "gitrag")?
        .data_local_dir()
        .to_path_buf();
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}
