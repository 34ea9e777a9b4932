use std::fs;
use std::path::{Path, PathBuf};

use super::{Toolchain, ToolchainError};

/// Toolchain that replays output captured into a directory:
///
/// ```text
/// commands/<target>.txt      ninja -t commands <target>
/// nm/<entry>.txt             nm --format=posix <entry>
/// objdump/<entry>.txt        objdump -a <entry>
/// stack_sizes/<entry>.bin    objcopy'd .stack_sizes section
/// ```
///
/// An object counts as present when its `nm` dump exists.
pub struct DumpDirToolchain {
    root: PathBuf,
}

impl DumpDirToolchain {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn command_path(&self, target: &str) -> PathBuf {
        self.root.join("commands").join(format!("{target}.txt"))
    }

    pub fn symbols_path(&self, entry: &str) -> PathBuf {
        self.root.join("nm").join(format!("{entry}.txt"))
    }

    pub fn format_path(&self, entry: &str) -> PathBuf {
        self.root.join("objdump").join(format!("{entry}.txt"))
    }

    pub fn stack_sizes_path(&self, entry: &str) -> PathBuf {
        self.root.join("stack_sizes").join(format!("{entry}.bin"))
    }
}

impl Toolchain for DumpDirToolchain {
    fn target_command(&self, target: &str) -> Result<String, ToolchainError> {
        let path = self.command_path(target);
        read_text(&path)?
            .lines()
            .last()
            .map(str::to_string)
            .ok_or_else(|| ToolchainError::Empty(path.display().to_string()))
    }

    fn has_artifact(&self, entry: &str) -> bool {
        self.symbols_path(entry).is_file()
    }

    fn symbol_dump(&self, entry: &str) -> Result<String, ToolchainError> {
        read_text(&self.symbols_path(entry))
    }

    fn file_format(&self, entry: &str) -> Result<String, ToolchainError> {
        read_text(&self.format_path(entry))
    }

    fn stack_sizes_section(&self, entry: &str) -> Result<Vec<u8>, ToolchainError> {
        let path = self.stack_sizes_path(entry);
        if !path.is_file() {
            return Err(ToolchainError::MissingDump(path));
        }
        fs::read(&path).map_err(|source| ToolchainError::Io { path, source })
    }

    fn name(&self) -> &'static str {
        "dump-dir"
    }
}

fn read_text(path: &Path) -> Result<String, ToolchainError> {
    if !path.is_file() {
        return Err(ToolchainError::MissingDump(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|source| ToolchainError::Io { path: path.to_path_buf(), source })
}
