use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};
use serde::Deserialize;
use thiserror::Error;
use tile_engine::{
    from_json_with_path, CollisionMap, FacingDirection, JsonPathError, ScreenRect, TileCoord,
    TileLayer, TileMap, TileMapError, TilePosition,
};

const OPEN_TILE: u16 = 0;
const WALL_TILE: u16 = 1;
const FRINGE_GRASS_TILE: u16 = 20;
const OBJECT_CRATE_TILE: u16 = 40;

#[derive(Debug, Error)]
pub(crate) enum ScenarioError {
    #[error("failed to read scenario '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("scenario {0}")]
    Parse(#[from] JsonPathError),
    #[error("scenario references unknown map '{name}'")]
    UnknownMap { name: String },
    #[error("map '{map}' row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        map: String,
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("map '{map}' has unknown cell '{cell}' at column {column}, row {row}")]
    UnknownCell {
        map: String,
        row: usize,
        column: usize,
        cell: char,
    },
    #[error("map '{map}' is invalid: {source}")]
    Map {
        map: String,
        #[source]
        source: TileMapError,
    },
    #[error("start tile {tile:?} is blocked on map '{map}'")]
    StartBlocked { map: String, tile: TileCoord },
    #[error("portal at tick {tick} spawns on blocked tile {tile:?} of map '{map}'")]
    SpawnBlocked {
        tick: u32,
        map: String,
        tile: TileCoord,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct ScenarioFile {
    name: String,
    #[serde(default = "default_viewport")]
    viewport: ScreenRect,
    start_map: String,
    start: TileCoord,
    #[serde(default)]
    facing: FacingDirection,
    ticks: u32,
    maps: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    events: Vec<ScenarioEvent>,
}

fn default_viewport() -> ScreenRect {
    ScreenRect::new(0.0, 0.0, 800.0, 480.0)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ScenarioEvent {
    pub(crate) tick: u32,
    #[serde(flatten)]
    pub(crate) action: ScenarioAction,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum ScenarioAction {
    FreeDirection {
        direction: Vec2,
    },
    Tap {
        point: Vec2,
    },
    ClearIntent,
    Portal {
        map: String,
        spawn: TileCoord,
        #[serde(default)]
        glide: Vec2,
    },
    DebugLine {
        from: Vec3,
        to: Vec3,
        #[serde(default)]
        lifetime: f32,
    },
    DebugBox {
        min: Vec3,
        max: Vec3,
        #[serde(default)]
        lifetime: f32,
    },
    DebugSphere {
        center: Vec3,
        radius: f32,
        #[serde(default)]
        lifetime: f32,
    },
}

/// A parsed, validated scenario: maps built, events sorted by tick.
#[derive(Debug, Clone)]
pub(crate) struct Scenario {
    pub(crate) name: String,
    pub(crate) viewport: ScreenRect,
    pub(crate) start_map: String,
    pub(crate) start: TilePosition,
    pub(crate) ticks: u32,
    pub(crate) maps: BTreeMap<String, TileMap>,
    pub(crate) events: Vec<ScenarioEvent>,
}

impl Scenario {
    pub(crate) fn load(path: &Path) -> Result<Self, ScenarioError> {
        let raw = fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub(crate) fn from_json_str(raw: &str) -> Result<Self, ScenarioError> {
        let file: ScenarioFile = from_json_with_path(raw)?;
        Self::from_file(file)
    }

    pub(crate) fn map(&self, name: &str) -> Option<&TileMap> {
        self.maps.get(name)
    }

    fn from_file(file: ScenarioFile) -> Result<Self, ScenarioError> {
        let mut maps = BTreeMap::new();
        for (name, rows) in &file.maps {
            maps.insert(name.clone(), parse_map_rows(name, rows)?);
        }

        let start_map = maps
            .get(&file.start_map)
            .ok_or_else(|| ScenarioError::UnknownMap {
                name: file.start_map.clone(),
            })?;
        if start_map.is_blocked(file.start) {
            return Err(ScenarioError::StartBlocked {
                map: file.start_map,
                tile: file.start,
            });
        }

        for event in &file.events {
            if let ScenarioAction::Portal { map, spawn, .. } = &event.action {
                let target = maps
                    .get(map)
                    .ok_or_else(|| ScenarioError::UnknownMap { name: map.clone() })?;
                if target.is_blocked(*spawn) {
                    return Err(ScenarioError::SpawnBlocked {
                        tick: event.tick,
                        map: map.clone(),
                        tile: *spawn,
                    });
                }
            }
        }

        let mut events = file.events;
        events.sort_by_key(|event| event.tick);

        Ok(Self {
            name: file.name,
            viewport: file.viewport,
            start_map: file.start_map,
            start: TilePosition::new(file.start, file.facing),
            ticks: file.ticks,
            maps,
            events,
        })
    }
}

/// Builds a map from text rows. `#` is a blocked wall, `.` open floor, a
/// digit an open floor with that base tile, `~` floor with a fringe overlay
/// and `*` floor with an object on top.
pub(crate) fn parse_map_rows(name: &str, rows: &[String]) -> Result<TileMap, ScenarioError> {
    let width = rows.first().map(|row| row.chars().count()).unwrap_or(0);
    let height = rows.len();
    let cell_count = width * height;

    let mut base = Vec::with_capacity(cell_count);
    let mut fringe = Vec::with_capacity(cell_count);
    let mut object = Vec::with_capacity(cell_count);
    let mut collision = Vec::with_capacity(cell_count);

    for (row_index, row) in rows.iter().enumerate() {
        let actual = row.chars().count();
        if actual != width {
            return Err(ScenarioError::RaggedRow {
                map: name.to_string(),
                row: row_index,
                expected: width,
                actual,
            });
        }
        for (column, cell) in row.chars().enumerate() {
            let (base_tile, fringe_tile, object_tile, blocked) = match cell {
                '#' => (WALL_TILE, None, None, true),
                '.' => (OPEN_TILE, None, None, false),
                '~' => (OPEN_TILE, Some(FRINGE_GRASS_TILE), None, false),
                '*' => (OPEN_TILE, None, Some(OBJECT_CRATE_TILE), false),
                digit if digit.is_ascii_digit() => {
                    (u16::from(digit as u8 - b'0'), None, None, false)
                }
                other => {
                    return Err(ScenarioError::UnknownCell {
                        map: name.to_string(),
                        row: row_index,
                        column,
                        cell: other,
                    })
                }
            };
            base.push(Some(base_tile));
            fringe.push(fringe_tile);
            object.push(object_tile);
            collision.push(blocked);
        }
    }

    let map_error = |source| ScenarioError::Map {
        map: name.to_string(),
        source,
    };
    TileMap::new(width as u32, height as u32, base, collision)
        .and_then(|map| map.with_layer(TileLayer::Fringe, fringe))
        .and_then(|map| map.with_layer(TileLayer::Object, object))
        .map_err(map_error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&str]) -> Vec<String> {
        lines.iter().map(ToString::to_string).collect()
    }

    const MINIMAL: &str = r########"{
        "name": "minimal",
        "start_map": "room",
        "start": { "x": 1, "y": 1 },
        "ticks": 10,
        "maps": { "room": ["###", "#.#", "###"] }
    }"########;

    #[test]
    fn parses_cells_into_layers() {
        let map = parse_map_rows("test", &rows(&["#.3", "~*."])).expect("map");
        assert_eq!(map.dimensions(), (3, 2));
        assert!(map.is_blocked(TileCoord::new(0, 0)));
        assert!(!map.is_blocked(TileCoord::new(1, 0)));
        assert_eq!(map.tile_at(TileLayer::Base, TileCoord::new(2, 0)), Some(3));
        assert_eq!(map.tile_at(TileLayer::Base, TileCoord::new(0, 0)), Some(WALL_TILE));
        assert_eq!(
            map.tile_at(TileLayer::Fringe, TileCoord::new(0, 1)),
            Some(FRINGE_GRASS_TILE)
        );
        assert_eq!(
            map.tile_at(TileLayer::Object, TileCoord::new(1, 1)),
            Some(OBJECT_CRATE_TILE)
        );
        assert_eq!(map.tile_at(TileLayer::Object, TileCoord::new(2, 1)), None);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let error = parse_map_rows("ragged", &rows(&["...", ".."])).expect_err("ragged");
        assert!(matches!(
            error,
            ScenarioError::RaggedRow {
                row: 1,
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn unknown_cells_are_rejected() {
        let error = parse_map_rows("odd", &rows(&[".?."])).expect_err("unknown cell");
        assert!(matches!(
            error,
            ScenarioError::UnknownCell {
                column: 1,
                cell: '?',
                ..
            }
        ));
    }

    #[test]
    fn empty_map_is_rejected() {
        let error = parse_map_rows("empty", &[]).expect_err("empty");
        assert!(matches!(
            error,
            ScenarioError::Map {
                source: TileMapError::ZeroDimensions { .. },
                ..
            }
        ));
    }

    #[test]
    fn minimal_scenario_uses_defaults() {
        let scenario = Scenario::from_json_str(MINIMAL).expect("scenario");
        assert_eq!(scenario.name, "minimal");
        assert_eq!(scenario.viewport, default_viewport());
        assert_eq!(scenario.start.tile, TileCoord::new(1, 1));
        assert_eq!(scenario.start.facing, FacingDirection::South);
        assert!(scenario.events.is_empty());
        assert!(scenario.map("room").is_some());
    }

    #[test]
    fn events_are_sorted_by_tick() {
        let raw = r##"{
            "name": "events",
            "start_map": "room",
            "start": { "x": 1, "y": 1 },
            "ticks": 10,
            "maps": { "room": ["....", "...."] },
            "events": [
                { "tick": 5, "kind": "clear_intent" },
                { "tick": 0, "kind": "free_direction", "direction": [80.0, 0.0] },
                { "tick": 3, "kind": "debug_sphere", "center": [0.0, 0.0, 0.0], "radius": 2.0 }
            ]
        }"##;
        let scenario = Scenario::from_json_str(raw).expect("scenario");
        let ticks: Vec<u32> = scenario.events.iter().map(|event| event.tick).collect();
        assert_eq!(ticks, vec![0, 3, 5]);
        assert_eq!(
            scenario.events[0].action,
            ScenarioAction::FreeDirection {
                direction: Vec2::new(80.0, 0.0)
            }
        );
        assert_eq!(
            scenario.events[1].action,
            ScenarioAction::DebugSphere {
                center: Vec3::ZERO,
                radius: 2.0,
                lifetime: 0.0
            }
        );
    }

    #[test]
    fn start_on_wall_is_rejected() {
        let raw = MINIMAL.replace(r#""x": 1, "y": 1"#, r#""x": 0, "y": 0"#);
        let error = Scenario::from_json_str(&raw).expect_err("blocked start");
        assert!(matches!(error, ScenarioError::StartBlocked { .. }));
    }

    #[test]
    fn portal_to_unknown_map_is_rejected() {
        let raw = MINIMAL.replace(
            r#""ticks": 10,"#,
            r#""ticks": 10, "events": [{ "tick": 1, "kind": "portal", "map": "attic", "spawn": { "x": 0, "y": 0 } }],"#,
        );
        let error = Scenario::from_json_str(&raw).expect_err("unknown portal map");
        match error {
            ScenarioError::UnknownMap { name } => assert_eq!(name, "attic"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn portal_spawn_must_be_open_and_in_bounds() {
        for (spawn, label) in [(r#"{ "x": 0, "y": 1 }"#, "wall"), (r#"{ "x": 7, "y": 1 }"#, "outside")] {
            let raw = MINIMAL.replace(
                r#""ticks": 10,"#,
                &format!(
                    r#""ticks": 10, "events": [{{ "tick": 4, "kind": "portal", "map": "room", "spawn": {spawn} }}],"#
                ),
            );
            let error = Scenario::from_json_str(&raw).expect_err(label);
            match error {
                ScenarioError::SpawnBlocked { tick, map, .. } => {
                    assert_eq!(tick, 4, "{label}");
                    assert_eq!(map, "room", "{label}");
                }
                other => panic!("unexpected error for {label}: {other}"),
            }
        }
    }

    #[test]
    fn parse_error_names_field_path() {
        let raw = MINIMAL.replace(r#""ticks": 10"#, r#""ticks": "many""#);
        let error = Scenario::from_json_str(&raw).expect_err("bad ticks");
        match error {
            ScenarioError::Parse(error) => assert_eq!(error.path, "$.ticks"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
