// src/config.rs
// Runtime tunables. Everything has compiled-in defaults; a JSON blob (file
// on native, inline string on web) can override any subset of fields.

use serde::{Deserialize, Serialize};

use crate::terrain::TerrainConfig;
use crate::vehicle::VehicleParams;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub vehicle: VehicleParams,
    pub terrain: TerrainConfig,
}

impl SimConfig {
    /// Parse overrides from JSON. Missing fields keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_or_default(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match Self::from_json_str(&text) {
                Ok(cfg) => {
                    log::info!("loaded config overrides from {path}");
                    cfg
                }
                Err(e) => {
                    log::warn!("ignoring malformed config {path}: {e}");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let cfg = SimConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, SimConfig::default());
    }

    #[test]
    fn partial_override_keeps_the_rest() {
        let cfg = SimConfig::from_json_str(
            r#"{ "vehicle": { "mass": 950.0 }, "terrain": { "seed": 42 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.vehicle.mass, 950.0);
        assert_eq!(cfg.terrain.seed, 42);
        // Untouched fields keep their defaults.
        assert_eq!(
            cfg.vehicle.engine_force,
            VehicleParams::default().engine_force
        );
        assert_eq!(
            cfg.terrain.half_extent,
            TerrainConfig::default().half_extent
        );
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SimConfig::from_json_str("{ nope").is_err());
    }
}
