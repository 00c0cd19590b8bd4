use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default bound on directory nesting.
pub const DEFAULT_MAX_DEPTH: u16 = 64;

/// Knobs for a directory tree scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Deepest directory level entered; `Some(0)` lists the root only.
    pub max_depth: Option<u16>,
    /// Emit a node for every directory as well as for files.
    pub include_directories: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            include_directories: false,
        }
    }
}

impl ScanOptions {
    pub fn root_only() -> Self {
        Self {
            max_depth: Some(0),
            include_directories: true,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Whether a directory `depth` levels below the root may be entered.
    pub fn allows_depth(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |max| depth <= max as usize)
    }
}
