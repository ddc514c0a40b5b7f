//! Run configuration, loaded from YAML.

use std::path::Path;

use anyhow::{Context, Result};
use flock_core::{SimulationParameters, Vec3};
use serde::{Deserialize, Serialize};

use crate::FlockError;

/// Everything needed to build and drive one flock run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockConfig {
    /// Number of agents
    #[serde(default = "default_population")]
    pub population: usize,

    /// Worker threads
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Seed for spawning and per-tick randomness
    pub seed: u64,

    /// Initial placement
    #[serde(default)]
    pub spawn: SpawnConfig,

    #[serde(default)]
    pub parameters: SimulationParameters,

    /// Static sphere obstacles
    #[serde(default)]
    pub obstacles: Vec<ObstacleConfig>,

    /// Danger actors moving at constant velocity
    #[serde(default)]
    pub dangers: Vec<DangerConfig>,

    /// Consumer frame cadence
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// External input refresh cadence
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
}

/// Agents are spawned uniformly inside a sphere with a random scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub center: Vec3,
    pub radius: f32,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            radius: 500.0,
            min_scale: 0.8,
            max_scale: 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleConfig {
    pub center: Vec3,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DangerConfig {
    pub position: Vec3,
    #[serde(default)]
    pub velocity: Vec3,
}

fn default_population() -> usize {
    1000
}
fn default_threads() -> usize {
    4
}
fn default_frame_interval_ms() -> u64 {
    33
}
fn default_refresh_interval_ms() -> u64 {
    500
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            population: default_population(),
            threads: default_threads(),
            seed: 0,
            spawn: SpawnConfig::default(),
            parameters: SimulationParameters::default(),
            obstacles: Vec::new(),
            dangers: Vec::new(),
            frame_interval_ms: default_frame_interval_ms(),
            refresh_interval_ms: default_refresh_interval_ms(),
        }
    }
}

impl FlockConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Load if the file exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }

    /// Same checks the coordinator applies at construction.
    pub fn validate(&self) -> std::result::Result<(), FlockError> {
        if self.threads == 0 {
            return Err(FlockError::InvalidThreadCount(self.threads));
        }
        if self.population == 0 {
            return Err(FlockError::EmptyPopulation);
        }
        self.parameters.validate()?;
        Ok(())
    }
}
