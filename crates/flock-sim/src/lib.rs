//! Multithreaded flock simulation.
//!
//! One OS thread per [`SimulationWorker`], each owning a fixed partition of
//! agents. The [`FlockCoordinator`] partitions the population, assigns
//! leaders, forwards external inputs and pulls published frames.

#![forbid(unsafe_code)]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod leaders;
pub mod observability;
pub mod partition;
pub mod worker;

pub use config::{DangerConfig, FlockConfig, ObstacleConfig, SpawnConfig};
pub use coordinator::FlockCoordinator;
pub use error::{FlockError, Result};
pub use leaders::{assign_leaders, LeaderRegistry};
pub use observability::{FrameEntry, FrameRecord, FrameRecorder, WorkerStats};
pub use partition::{partition, partition_sizes, spawn_agents};
pub use worker::{SimulationWorker, WorkerState};
