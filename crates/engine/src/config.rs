use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::debug_draw::DebugDrawConfig;
use crate::world::MovementConfig;

pub const DEFAULT_TILE_SIZE: Vec2 = Vec2::new(32.0, 32.0);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config {0}")]
    Parse(#[from] JsonPathError),
    #[error("config field '{field}' {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// A JSON document that failed to deserialize, with the JSONPath-style
/// location of the offending value (`$` for the document root).
#[derive(Debug, Error)]
#[error("json invalid at {path}: {source}")]
pub struct JsonPathError {
    pub path: String,
    #[source]
    pub source: serde_json::Error,
}

pub fn from_json_with_path<T: DeserializeOwned>(raw: &str) -> Result<T, JsonPathError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        let source = error.into_inner();
        let path = if path.is_empty() || path == "." {
            "$".to_string()
        } else {
            format!("$.{path}")
        };
        JsonPathError { path, source }
    })
}

/// Tunables for the world and debug-draw subsystems. Every field is optional
/// in JSON and falls back to its default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub tile_size: Vec2,
    pub movement: MovementConfig,
    pub debug_draw: DebugDrawConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            movement: MovementConfig::default(),
            debug_draw: DebugDrawConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = from_json_with_path(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tile_size.is_finite() && self.tile_size.cmpgt(Vec2::ZERO).all()) {
            return Err(invalid(
                "tile_size",
                format!("must be finite and positive, got {}", self.tile_size),
            ));
        }

        let movement = &self.movement;
        if !(movement.speed_per_tick.is_finite() && movement.speed_per_tick > 0.0) {
            return Err(invalid(
                "movement.speed_per_tick",
                format!("must be positive, got {}", movement.speed_per_tick),
            ));
        }
        for (field, value) in [
            ("movement.input_deadzone", movement.input_deadzone),
            ("movement.collision_tolerance", movement.collision_tolerance),
            ("movement.follow_arrival_threshold", movement.follow_arrival_threshold),
            ("movement.follow_step", movement.follow_step),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, format!("must be non-negative, got {value}")));
            }
        }
        // Offsets stay within half a tile, so a step of at most half the
        // smaller tile side crosses at most one tile edge per axis.
        let max_speed = self.tile_size.min_element() * 0.5;
        if movement.speed_per_tick > max_speed {
            return Err(invalid(
                "movement.speed_per_tick",
                format!(
                    "must be at most half the smaller tile side ({max_speed}), got {}",
                    movement.speed_per_tick
                ),
            ));
        }
        // Offsets advance in whole speed steps; a tolerance between steps is
        // never hit exactly.
        if movement.collision_tolerance % movement.speed_per_tick != 0.0 {
            return Err(invalid(
                "movement.collision_tolerance",
                format!(
                    "must be a multiple of speed_per_tick ({}), got {}",
                    movement.speed_per_tick, movement.collision_tolerance
                ),
            ));
        }

        if self.debug_draw.max_lines_per_draw == 0 {
            return Err(invalid("debug_draw.max_lines_per_draw", "must be at least 1".to_string()));
        }
        if self.debug_draw.sphere_resolution < 3 {
            return Err(invalid(
                "debug_draw.sphere_resolution",
                format!("must be at least 3, got {}", self.debug_draw.sphere_resolution),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
