//! Process configuration: listen port and map file path. Per spec §6 there
//! are no CLI flags; the port is "a compile-time or config constant". This
//! loads an optional `config/default.toml`, layered with
//! `HIGHWAY_PLANNER_*` environment overrides, falling back to the spec's
//! defaults when neither is present.

use serde::Deserialize;

const DEFAULT_PORT: u16 = 4567;
const DEFAULT_MAP_FILE: &str = "data/highway_map.csv";

#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_map_file")]
    pub map_file: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_map_file() -> String {
    DEFAULT_MAP_FILE.to_string()
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT, map_file: DEFAULT_MAP_FILE.to_string() }
    }
}

impl PlannerConfig {
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .set_default("port", DEFAULT_PORT as i64)?
            .set_default("map_file", DEFAULT_MAP_FILE)?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("HIGHWAY_PLANNER"))
            .build()?;

        let config = settings.try_deserialize()?;
        Ok(config)
    }
}
