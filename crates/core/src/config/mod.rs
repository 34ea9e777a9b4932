use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::SIMD_NAMESPACES;
use crate::{StatsError, StatsResult};

/// Serializable configuration for a size statistics run.
///
/// Every field has a default, so a config file only needs the values it
/// changes. CLI flags are applied on top of whatever is loaded here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Build directory the link commands and object paths are relative to.
    pub build_dir: PathBuf,
    /// Prefix for binutils programs, e.g. `aarch64-linux-gnu-`.
    pub binutils: String,
    /// Program used to query link commands.
    pub ninja: String,
    /// Optional path the JSON document is written to.
    pub save: Option<PathBuf>,
    /// How many stack entries to print; `0` prints all of them.
    pub top_stack_entries: usize,
    /// Specialization namespaces split out of the final binary.
    pub namespaces: Vec<String>,
    /// Directory of captured toolchain output to read instead of running tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dumps: Option<PathBuf>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            build_dir: PathBuf::from("build"),
            binutils: String::new(),
            ninja: "ninja".to_string(),
            save: None,
            top_stack_entries: 20,
            namespaces: SIMD_NAMESPACES.iter().map(|ns| ns.to_string()).collect(),
            dumps: None,
        }
    }
}

impl StatsConfig {
    /// Load a config from a `.json`, `.yaml` or `.yml` file.
    pub fn load(path: &Path) -> StatsResult<Self> {
        let body = fs::read_to_string(path)
            .map_err(|source| StatsError::Io { path: path.to_path_buf(), source })?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        match ext {
            "json" => Ok(serde_json::from_str(&body)?),
            "yaml" | "yml" => serde_yaml::from_str(&body).map_err(|e| {
                StatsError::Config(format!("failed to parse {}: {e}", path.display()))
            }),
            other => Err(StatsError::Config(format!(
                "unsupported config extension {other:?} for {}",
                path.display()
            ))),
        }
    }
}
