use glam::{Quat, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identity of an external actor (obstacle owner, pawn, follow target).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActorId(pub u64);

/// Rigid transform plus the visual scale chosen by the spawner.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Kinematic state of one flock member.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AgentState {
    /// Maps back to the external visual instance; positional order in a
    /// collected frame is not meaningful.
    pub instance_index: usize,
    pub transform: Transform,
    pub velocity: Vec3,
    pub wander_target: Vec3,
    pub time_since_wander: f32,
    pub is_leader: bool,
    /// Cleared at the start of every tick.
    pub threats_in_attack_range: Vec<ActorId>,
}

impl AgentState {
    pub fn new(instance_index: usize, transform: Transform) -> Self {
        Self {
            instance_index,
            transform,
            velocity: Vec3::ZERO,
            // Reaching the target immediately makes the first wander pick a fresh one.
            wander_target: transform.position,
            time_since_wander: 0.0,
            is_leader: false,
            threats_in_attack_range: Vec::new(),
        }
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    pub(crate) fn mark_threat(&mut self, id: ActorId) {
        if !self.threats_in_attack_range.contains(&id) {
            self.threats_in_attack_range.push(id);
        }
    }
}
