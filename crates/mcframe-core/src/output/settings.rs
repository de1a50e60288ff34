//! The output policy: which files are written, how often, and where.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading settings from disk.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// Policy for the per-step state trajectory output.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StateSettings {
    pub enable: bool,
    /// Steps between frames.
    pub frequency: u64,
    /// Destination coordinate file, one per box.
    pub files: Vec<PathBuf>,
}

/// Policy for the full-overwrite restart snapshots.
///
/// Restart destinations are derived from the state file names, so no path
/// list appears here.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RestartSettings {
    pub enable: bool,
    /// Steps between snapshots.
    pub frequency: u64,
}

/// Policy for the one-shot topology output.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TopologySettings {
    pub enable: bool,
    pub file: PathBuf,
}

/// The per-box occupancy-code table of the coordinate format.
///
/// The occupancy column encodes which box currently owns an atom; `codes[b]`
/// is written for atoms owned by box `b` in every box's file, and `default`
/// is used where no owning box applies (restart snapshots).
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OccupancySettings {
    pub codes: Vec<String>,
    pub default: String,
}

impl Default for OccupancySettings {
    fn default() -> Self {
        Self {
            codes: vec!["0.00".to_string(), "1.00".to_string()],
            default: "0.00".to_string(),
        }
    }
}

/// The complete output policy consumed by the writer layer.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputSettings {
    pub state: StateSettings,
    pub restart: RestartSettings,
    pub topology: TopologySettings,
    #[serde(default)]
    pub occupancy: OccupancySettings,
}

impl OutputSettings {
    /// Loads the policy from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or does not parse.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| SettingsError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }
}

/// The restart destination derived from a state file name: the `.pdb` suffix
/// is replaced with `_restart.pdb`.
pub(crate) fn restart_path(state_path: &Path) -> PathBuf {
    let stem = state_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    state_path.with_file_name(format!("{stem}_restart.pdb"))
}
