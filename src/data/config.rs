//! Engine configuration
//!
//! Tunables for sight radius, memorization options, flow and scent.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::loader::{export_ron, load_ron, DataError};

/// Default full sight radius
pub const MAX_SIGHT: i32 = 20;
/// Largest sight radius the view algorithm is tuned for
pub const MAX_SIGHT_LIMIT: i32 = 60;
/// Default depth cap of the monster flow field
pub const MONSTER_FLOW_DEPTH: u16 = 32;
/// Default number of pending cells the flow queue can hold
pub const FLOW_QUEUE_CAPACITY: usize = 2297;
/// Default scent epoch at which stamps are halved
pub const SCENT_WRAP: u16 = 254;

/// Vision engine options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Full sight radius
    pub max_sight: i32,
    /// Use a halved sight radius in the town
    pub reduce_view_in_town: bool,
    /// Memorize boring cells when torch-lit
    pub view_torch_grids: bool,
    /// Memorize boring cells when permanently lit
    pub view_perma_grids: bool,
    /// Flow field depth cap in steps
    pub flow_depth: u16,
    /// Maximum number of cells waiting in the flow queue
    pub flow_queue_capacity: usize,
    /// Scent epoch that triggers halving
    pub scent_wrap: u16,
    /// Game turns in a full day/night cycle
    pub day_length: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            max_sight: MAX_SIGHT,
            reduce_view_in_town: false,
            view_torch_grids: false,
            view_perma_grids: true,
            flow_depth: MONSTER_FLOW_DEPTH,
            flow_queue_capacity: FLOW_QUEUE_CAPACITY,
            scent_wrap: SCENT_WRAP,
            day_length: 10_000,
        }
    }
}

impl VisionConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let config: VisionConfig = load_ron(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, falling back to defaults if it is missing or bad
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded vision config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{}. Using default vision config.", e);
                Self::default()
            }
        }
    }

    /// Write this config as pretty RON
    pub fn export(&self, path: &Path) -> Result<(), DataError> {
        export_ron(self, path)
    }

    /// Write the default config, e.g. to seed `assets/config/vision.ron`
    pub fn export_default(path: &Path) -> Result<(), DataError> {
        Self::default().export(path)
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if !(1..=MAX_SIGHT_LIMIT).contains(&self.max_sight) {
            return Err(DataError::Invalid(format!(
                "max_sight must be within 1..={}, got {}",
                MAX_SIGHT_LIMIT, self.max_sight
            )));
        }
        if self.flow_depth == 0 {
            return Err(DataError::Invalid("flow_depth must be positive".into()));
        }
        if self.flow_queue_capacity == 0 {
            return Err(DataError::Invalid("flow_queue_capacity must be positive".into()));
        }
        if !(4..=u16::MAX - 2).contains(&self.scent_wrap) {
            return Err(DataError::Invalid(format!(
                "scent_wrap must be within 4..={}, got {}",
                u16::MAX - 2,
                self.scent_wrap
            )));
        }
        if self.day_length < 2 {
            return Err(DataError::Invalid("day_length must be at least 2".into()));
        }
        Ok(())
    }

    /// Full sight radius and octagon bound for the current level
    pub fn sight_bounds(&self, is_town: bool) -> (i32, i32) {
        if self.reduce_view_in_town && is_town {
            (self.max_sight / 2, self.max_sight * 3 / 4)
        } else {
            (self.max_sight, self.max_sight * 3 / 2)
        }
    }
}
