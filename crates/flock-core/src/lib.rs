//! Deterministic, thread-free flocking primitives.
//!
//! Everything in this crate operates on plain data: one partition of agents,
//! an immutable parameter snapshot, and a read-only snapshot of external
//! inputs. Threading lives in `flock-sim`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod agent;
pub mod composer;
pub mod external;
pub mod math;
pub mod neighbors;
pub mod params;
pub mod rng;
pub mod steering;
pub mod tick;

pub use agent::{ActorId, AgentState, Transform};
pub use composer::{ForceComposer, StepSummary};
pub use external::{
    ActorHandle, ClosestPoint, EntityKind, ExternalEntity, ExternalSnapshot, Locate, Obstacle,
    Sphere, TrackedPosition,
};
pub use math::Aabb;
pub use neighbors::{BruteForceNeighbors, NeighborQuery};
pub use params::{BoundaryMode, LeaderMode, ParamError, SimulationParameters, ThreatReaction};
pub use rng::{DeterministicRng, SplitMix64};
pub use tick::TickContext;

pub use glam::{Quat, Vec3};
