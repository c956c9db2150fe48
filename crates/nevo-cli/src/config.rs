//! Configuration management for the nevo CLI

use std::path::Path;

use serde::{Deserialize, Serialize};

use nevo_evolve::EvolveParams;

use crate::error::{CliError, CliResult};

/// Engine configuration, loadable from a TOML file
///
/// Every field has a default, so a config file only needs to name the
/// values it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of genomes in the pool
    pub pool_size: usize,

    /// Number of slots that survive each generation
    pub pool_keep: usize,

    /// Tasks evaluated per generation
    pub tasks_per_generation: usize,

    /// Questions per task
    pub questions_per_task: usize,

    /// Fitness penalty per gene
    pub length_penalty: f32,

    /// Fitness penalty per unit of thinking time
    pub time_penalty: f32,

    /// Generations between peer-exchange initiations
    pub exchange_interval: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let params = EvolveParams::default();
        Self {
            pool_size: params.pool_size,
            pool_keep: params.pool_keep,
            tasks_per_generation: params.tasks_per_generation,
            questions_per_task: params.questions_per_task,
            length_penalty: params.length_penalty,
            time_penalty: params.time_penalty,
            exchange_interval: 25,
        }
    }
}

impl EngineConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load_from_file(path: &Path) -> CliResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)
                .map_err(|e| CliError::config(format!("Invalid config file: {}", e)))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> CliResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the config for a workspace directory
    ///
    /// An explicit `--config` path wins; otherwise `<dir>/nevo.toml` is
    /// consulted and defaults apply when neither exists.
    pub fn resolve(dir: &Path, explicit: Option<&Path>) -> CliResult<Self> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None => Self::load_from_file(&dir.join("nevo.toml")),
        }
    }

    /// The evolver parameters this config describes
    pub fn evolve_params(&self) -> EvolveParams {
        EvolveParams {
            pool_size: self.pool_size,
            pool_keep: self.pool_keep,
            tasks_per_generation: self.tasks_per_generation,
            questions_per_task: self.questions_per_task,
            length_penalty: self.length_penalty,
            time_penalty: self.time_penalty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_evolve_params() {
        let config = EngineConfig::default();
        assert!(config.evolve_params().validate().is_ok());
        assert_eq!(config.pool_size, 32);
        assert_eq!(config.exchange_interval, 25);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config: EngineConfig = toml::from_str("pool_size = 16\npool_keep = 10\n").unwrap();
        assert_eq!(config.pool_size, 16);
        assert_eq!(config.pool_keep, 10);
        assert_eq!(config.questions_per_task, 600);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nevo.toml");
        let mut config = EngineConfig::default();
        config.pool_size = 12;
        config.save_to_file(&path).unwrap();
        let back = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(back.pool_size, 12);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::resolve(dir.path(), None).unwrap();
        assert_eq!(config.pool_size, EngineConfig::default().pool_size);
    }
}
