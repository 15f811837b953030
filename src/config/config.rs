use crate::clustering::{RelativeAverage, Weights};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_inc_weight")]
    pub inc_weight: f64,
    #[serde(default = "default_unit_weight")]
    pub dup_weight: f64,
    #[serde(default = "default_unit_weight")]
    pub loss_weight: f64,
    #[serde(default = "default_unit_weight")]
    pub spread_weight: f64,
    /// 0 keeps every significant dimension.
    #[serde(default)]
    pub max_dimensions: usize,
    #[serde(default)]
    pub relative_average: RelativeAverage,
    #[serde(default)]
    pub cache_embeddings: bool,
    #[serde(default = "default_threads")]
    pub threads: usize,
}

fn default_inc_weight() -> f64 {
    0.5
}

fn default_unit_weight() -> f64 {
    1.0
}

fn default_threads() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inc_weight: default_inc_weight(),
            dup_weight: default_unit_weight(),
            loss_weight: default_unit_weight(),
            spread_weight: default_unit_weight(),
            max_dimensions: 0,
            relative_average: RelativeAverage::default(),
            cache_embeddings: false,
            threads: default_threads(),
        }
    }
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "miphy", "miphy-tools").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// The user's `config.toml`, or defaults when it is missing or unreadable.
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        toml::from_str(&content).ok()
    }

    pub fn weights(&self) -> Weights {
        Weights {
            incongruence: self.inc_weight,
            duplication: self.dup_weight,
            loss: self.loss_weight,
            spread: self.spread_weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str("dup_weight = 2.5\nrelative_average = \"mean\"\n").unwrap();
        assert_eq!(config.dup_weight, 2.5);
        assert_eq!(config.inc_weight, 0.5);
        assert_eq!(config.relative_average, RelativeAverage::Mean);
        assert_eq!(config.threads, 4);
        assert!(!config.cache_embeddings);
    }

    #[test]
    fn weights_follow_the_file() {
        let config: Config = toml::from_str("inc_weight = 2.0\nspread_weight = 0.0\n").unwrap();
        let weights = config.weights();
        assert_eq!(weights.incongruence, 2.0);
        assert_eq!(weights.duplication, 1.0);
        assert_eq!(weights.loss, 1.0);
        assert_eq!(weights.spread, 0.0);
        assert_eq!(Config::default().weights().incongruence, 0.5);
    }
}
