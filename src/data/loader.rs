//! RON data loader
//!
//! Loads configuration and terrain data from external RON files, with
//! fallback to hardcoded defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::config::VisionConfig;
use super::terrain::default_terrain_table;
use crate::world::TerrainTable;

/// Default location of the data files
pub const DATA_DIR: &str = "assets/data";
/// Default location of the configuration files
pub const CONFIG_DIR: &str = "assets/config";

/// Errors raised while loading or saving external data
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
    #[error("failed to serialize: {0}")]
    Serialize(String),
    #[error("invalid data: {0}")]
    Invalid(String),
}

/// Read and parse a RON file
pub fn load_ron<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let content = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&content).map_err(|e| DataError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Write a value as pretty RON, creating parent directories as needed
pub fn export_ron<T: Serialize>(value: &T, path: &Path) -> Result<(), DataError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| DataError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let text = ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
        .map_err(|e| DataError::Serialize(e.to_string()))?;
    fs::write(path, text).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Manages all external engine data
#[derive(Debug, Clone)]
pub struct DataManager {
    pub config: VisionConfig,
    pub terrain: TerrainTable,
}

impl DataManager {
    /// Load from the default asset directories, falling back to defaults
    pub fn new() -> Self {
        Self::load_from(Path::new(CONFIG_DIR), Path::new(DATA_DIR))
    }

    /// Load from explicit directories. Missing files silently use defaults;
    /// unreadable or invalid files are logged and replaced by defaults.
    pub fn load_from(config_dir: &Path, data_dir: &Path) -> Self {
        Self {
            config: VisionConfig::load_or_default(&config_dir.join("vision.ron")),
            terrain: Self::load_terrain(&data_dir.join("terrain.ron")),
        }
    }

    fn load_terrain(path: &Path) -> TerrainTable {
        if !path.exists() {
            return default_terrain_table();
        }
        match load_ron::<TerrainTable>(path) {
            Ok(table) if !table.is_empty() => {
                log::info!("Loaded {} terrains from {}", table.len(), path.display());
                table
            }
            Ok(_) => {
                log::warn!("{} defines no terrain, using defaults", path.display());
                default_terrain_table()
            }
            Err(e) => {
                log::warn!("{}. Using default terrain.", e);
                default_terrain_table()
            }
        }
    }
}

impl Default for DataManager {
    fn default() -> Self {
        Self {
            config: VisionConfig::default(),
            terrain: default_terrain_table(),
        }
    }
}

/// Export all default data to RON files for easy editing
pub fn export_default_data(config_dir: &Path, data_dir: &Path) -> Result<(), DataError> {
    VisionConfig::export_default(&config_dir.join("vision.ron"))?;
    export_ron(&default_terrain_table(), &data_dir.join("terrain.ron"))?;
    Ok(())
}
