use highway_planner::config::PlannerConfig;
use highway_planner::map::Map;
use highway_planner::transport::{self, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = PlannerConfig::load()?;

    let map = Map::load(&config.map_file)
        .map_err(|err| anyhow::anyhow!("failed to load map from {}: {err}", config.map_file))?;
    tracing::info!(waypoints = map.len(), max_s = map.max_s, "map loaded");

    let state = AppState::new(map);
    transport::serve(config.port, state).await
}
