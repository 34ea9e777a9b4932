use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

pub mod commands;

/// Resolve a directory argument to an absolute path, relative to the
/// current working directory, and check that it exists.
pub fn resolve_dir(dir: &Path) -> Result<PathBuf> {
    let path = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        env::current_dir().context("Failed to get current directory")?.join(dir)
    };
    if !path.is_dir() {
        return Err(anyhow!("Directory does not exist: {}", path.display()));
    }
    Ok(path)
}
