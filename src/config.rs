use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::scoring::ScoringWeights;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Candidates requested from a platform before filtering.
    pub candidate_pool: u32,
    /// Videos requested from the trending chart.
    pub trending_pool: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            candidate_pool: 25,
            trending_pool: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Max concurrent navigation sessions per store; least-recently-touched
    /// sessions are evicted beyond this.
    pub capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { capacity: 512 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scoring: ScoringWeights,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), String> {
        let config_path = path.or_else(default_config_path);
        let mut config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| format!("failed to read config: {}", err))?;
                toml::from_str(&contents)
                    .map_err(|err| format!("failed to parse config: {}", err))?
            } else {
                AppConfig::default()
            }
        } else {
            AppConfig::default()
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| format!("failed to create config dir: {}", err))?;
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| format!("failed to serialize config: {}", err))?;
        std::fs::write(path, payload).map_err(|err| format!("failed to write config: {}", err))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(pool) = env::var("VIRALSCOPE_CANDIDATE_POOL") {
            if let Ok(value) = pool.parse::<u32>() {
                self.search.candidate_pool = value;
            }
        }
        if let Ok(pool) = env::var("VIRALSCOPE_TRENDING_POOL") {
            if let Ok(value) = pool.parse::<u32>() {
                self.search.trending_pool = value;
            }
        }
        if let Ok(capacity) = env::var("VIRALSCOPE_SESSION_CAPACITY") {
            if let Ok(value) = capacity.parse::<usize>() {
                self.session.capacity = value.max(1);
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("VIRALSCOPE_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/viralscope.toml")))
}
