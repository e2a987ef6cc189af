use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tile_engine::{ConfigError, EngineConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::loop_runner::LoopConfig;
use super::scenario::{Scenario, ScenarioError};

const CONFIG_ENV_VAR: &str = "TILE_DEMO_CONFIG";
const SCENARIO_ENV_VAR: &str = "TILE_DEMO_SCENARIO";
const FRAME_MS_ENV_VAR: &str = "TILE_DEMO_FRAME_MS";
const DEFAULT_SCENARIO: &str = include_str!("../../scenarios/default.json");

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

pub(crate) struct AppWiring {
    pub(crate) engine: EngineConfig,
    pub(crate) loop_config: LoopConfig,
    pub(crate) scenario: Scenario,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Tile Demo Startup ===");

    let config_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    let scenario_path = std::env::var_os(SCENARIO_ENV_VAR).map(PathBuf::from);
    let frame_ms = parse_frame_ms_from_env();
    wire(config_path, scenario_path, frame_ms)
}

fn wire(
    config_path: Option<PathBuf>,
    scenario_path: Option<PathBuf>,
    frame_ms: Option<u64>,
) -> Result<AppWiring, AppError> {
    let engine = match &config_path {
        Some(path) => {
            let engine = EngineConfig::load(path)?;
            info!(path = %path.display(), "config_loaded");
            engine
        }
        None => EngineConfig::default(),
    };

    let scenario = match &scenario_path {
        Some(path) => Scenario::load(path)?,
        None => Scenario::from_json_str(DEFAULT_SCENARIO)?,
    };
    info!(
        scenario = %scenario.name,
        source = %scenario_path
            .as_deref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "embedded".to_string()),
        maps = scenario.maps.len(),
        "scenario_loaded"
    );

    let mut loop_config = LoopConfig::default();
    if let Some(frame_ms) = frame_ms {
        loop_config.frame_time = Duration::from_millis(frame_ms);
        info!(frame_ms, "simulated_frame_time_override");
    }

    Ok(AppWiring {
        engine,
        loop_config,
        scenario,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_frame_ms_from_env() -> Option<u64> {
    std::env::var(FRAME_MS_ENV_VAR)
        .ok()
        .and_then(|raw| parse_frame_ms(&raw))
}

fn parse_frame_ms(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|ms| *ms > 0)
}
