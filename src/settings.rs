//! World settings and settling tuning
//!
//! Defaults come from `crate::consts`; a JSON file may override any subset.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::SettleParams;

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// World constraints and simulation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === World ===
    /// World width (positions are valid in `[0, world_width]`)
    pub world_width: f32,
    /// World height (positions are valid in `[0, world_height]`)
    pub world_height: f32,

    // === Bodies ===
    /// Lower extent bound; radii start at 0.55x this
    pub min_extent: f32,
    /// Upper extent bound; radii stay below 0.45x this, and grid cells use it as size
    pub max_extent: f32,
    /// Speed used for wall bounces and the cap for random velocities
    pub max_velocity: f32,
    /// Bodies to place at world creation
    pub body_count: usize,
    /// Run seed for reproducibility
    pub seed: u64,

    // === Settling ===
    /// Sub-steps per island per frame
    pub settle_substeps: u32,
    /// Sub-step duration as a fraction of a frame
    pub settle_dt: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,

            min_extent: MIN_EXTENT,
            max_extent: MAX_EXTENT,
            max_velocity: MAX_VELOCITY,
            body_count: BODY_COUNT,
            seed: DEFAULT_SEED,

            settle_substeps: SETTLE_SUBSTEPS,
            settle_dt: SETTLE_DT,
        }
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

impl Settings {
    /// Load settings from a JSON file and validate them
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse settings from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the constraints the pipeline relies on
    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |msg: String| Err(SettingsError::Invalid(msg));

        if !positive(self.world_width) || !positive(self.world_height) {
            return invalid(format!(
                "world must have positive size, got {}x{}",
                self.world_width, self.world_height
            ));
        }
        if !positive(self.min_extent) || !positive(self.max_extent) {
            return invalid("extents must be positive".into());
        }
        if self.min_extent > self.max_extent {
            return invalid(format!(
                "min_extent {} exceeds max_extent {}",
                self.min_extent, self.max_extent
            ));
        }
        if self.min_radius() > self.max_radius() {
            return invalid(format!(
                "radius range is empty ({} > {})",
                self.min_radius(),
                self.max_radius()
            ));
        }
        if !positive(self.max_velocity) {
            return invalid("max_velocity must be positive".into());
        }
        if self.settle_substeps == 0 {
            return invalid("settle_substeps must be at least 1".into());
        }
        if !positive(self.settle_dt) {
            return invalid("settle_dt must be positive".into());
        }
        let margin = self.spawn_margin();
        if self.world_width <= 2.0 * margin || self.world_height <= 2.0 * margin {
            return invalid(format!(
                "world {}x{} leaves no room inside the spawn margin {}",
                self.world_width, self.world_height, margin
            ));
        }
        Ok(())
    }

    /// Grid cell size (never smaller than the largest possible diameter)
    pub fn cell_size(&self) -> f32 {
        self.max_extent
    }

    /// Distance spawned bodies keep from the walls
    pub fn spawn_margin(&self) -> f32 {
        SPAWN_MARGIN_EXTENTS * self.max_extent
    }

    pub fn min_radius(&self) -> f32 {
        RADIUS_MIN_FACTOR * self.min_extent
    }

    pub fn max_radius(&self) -> f32 {
        RADIUS_MAX_FACTOR * self.max_extent
    }

    /// Settling parameters for the island resolver
    pub fn settle_params(&self) -> SettleParams {
        SettleParams {
            substeps: self.settle_substeps,
            dt: self.settle_dt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        // Largest diameter must fit in one cell
        assert!(2.0 * settings.max_radius() <= settings.cell_size());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "body_count": 64, "seed": 7 }"#).unwrap();
        assert_eq!(settings.body_count, 64);
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.world_width, WORLD_WIDTH);
        assert_eq!(settings.settle_substeps, SETTLE_SUBSTEPS);
    }

    #[test]
    fn test_malformed_json() {
        let err = Settings::from_json("{ body_count: ").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_rejects_bad_constraints() {
        let cases = [
            r#"{ "world_width": 0.0 }"#,
            r#"{ "min_extent": 10.0, "max_extent": 4.0 }"#,
            r#"{ "max_velocity": -1.0 }"#,
            r#"{ "settle_substeps": 0 }"#,
            r#"{ "settle_dt": 0.0 }"#,
            r#"{ "world_width": 50.0 }"#,
        ];
        for json in cases {
            let err = Settings::from_json(json).unwrap_err();
            assert!(matches!(err, SettingsError::Invalid(_)), "{json} should be invalid");
        }
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::load(Path::new("/nonexistent/circle-islands.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"body_count": 32, "seed": 9, "settle_dt": 0.25}}"#).unwrap();
        file.flush().unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.body_count, 32);
        assert_eq!(settings.seed, 9);
        assert_eq!(settings.settle_dt, 0.25);
        assert_eq!(settings.world_width, Settings::default().world_width);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"world_width": 50.0}}"#).unwrap();
        file.flush().unwrap();

        let err = Settings::load(file.path()).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));
    }

    #[test]
    fn test_settle_params() {
        let params = Settings::default().settle_params();
        assert_eq!(params.substeps, 8);
        assert_eq!(params.dt, 0.125);
    }
}
