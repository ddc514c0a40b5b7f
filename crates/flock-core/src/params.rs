//! Immutable simulation parameters shared read-only by every worker.

use glam::Vec3;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Aabb;

/// How far below the height ceiling a clamped wander target is placed.
pub const WANDER_HEIGHT_MARGIN: f32 = 50.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("parameter `{name}` must be finite")]
    NonFinite { name: &'static str },
    #[error("parameter `{name}` must not be negative")]
    Negative { name: &'static str },
    #[error("speed jitter {jitter} exceeds max speed {max_speed}")]
    JitterExceedsMaxSpeed { jitter: f32, max_speed: f32 },
    #[error("startup jitter range [{0}, {1}] is inverted")]
    InvalidStartupJitter(f32, f32),
    #[error("boundary volume must have positive, finite extents")]
    DegenerateBoundary,
}

/// Region the flock is kept inside.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "mode", rename_all = "snake_case"))]
pub enum BoundaryMode {
    /// Unbounded; wander targets are drawn around `wander_origin`.
    None,
    /// Agents outside the volume steer back toward its center.
    Volume { bounds: Aabb },
}

/// Which agents lead and what followers seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LeaderMode {
    /// Agent 0 of partition 0 leads the whole flock.
    SingleGlobal,
    /// Agent 0 of every partition leads that partition.
    PerPartition,
    /// No leaders; everyone seeks the designated external actor.
    FollowActor,
}

/// Reaction to danger actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "mode", rename_all = "snake_case"))]
pub enum ThreatReaction {
    Flee,
    /// Chase the nearest danger actor; with `can_attack`, record the ones in
    /// attack range for the consumer to damage.
    Pursue { can_attack: bool },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationParameters {
    // Behavior weights.
    pub follow_scale: f32,
    pub cohesion_scale: f32,
    pub align_scale: f32,
    pub separation_scale: f32,
    pub flee_scale: f32,
    /// Weight of obstacle avoidance.
    pub avoidance_scale: f32,
    /// Weight of boundary and height-ceiling avoidance.
    pub boundary_scale: f32,

    // Radii.
    pub mate_awareness_radius: f32,
    pub separation_radius: f32,
    pub enemy_awareness_radius: f32,
    pub follow_pawn_awareness_radius: f32,
    pub avoidance_primitive_distance: f32,
    /// Divisor turning `enemy_awareness_radius` into the escape strength.
    pub escape_strength_offset: f32,

    // Speed.
    pub max_speed: f32,
    pub speed_jitter: f32,
    pub escape_speed_multiplier: f32,
    pub max_steering_force: f32,

    // Rotation and integration rates (per second).
    pub mate_rotation_rate: f32,
    pub escape_rotation_rate: f32,
    pub position_interp_rate: f32,

    // Wander.
    pub wander_update_rate: f32,
    pub min_wander_distance: f32,
    pub wander_random_radius: f32,
    pub wander_origin: Vec3,

    pub boundary: BoundaryMode,
    pub max_height: Option<f32>,
    pub leader_mode: LeaderMode,
    pub threat_reaction: ThreatReaction,
    pub react_on_pawn: bool,
    pub auto_add_obstacles: bool,
    pub attack_radius: f32,
    pub damage_amount: f32,

    // Worker pacing.
    pub startup_jitter_secs: [f32; 2],
    /// Rest after each published tick; added to the measured delta.
    pub cooldown_secs: f32,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            follow_scale: 1.0,
            cohesion_scale: 0.6,
            align_scale: 0.4,
            separation_scale: 5.0,
            flee_scale: 10.0,
            avoidance_scale: 10.0,
            boundary_scale: 10.0,
            mate_awareness_radius: 400.0,
            separation_radius: 6.0,
            enemy_awareness_radius: 200.0,
            follow_pawn_awareness_radius: 500.0,
            avoidance_primitive_distance: 50.0,
            escape_strength_offset: 100.0,
            max_speed: 40.0,
            speed_jitter: 5.0,
            escape_speed_multiplier: 2.0,
            max_steering_force: 100.0,
            mate_rotation_rate: 0.6,
            escape_rotation_rate: 10.0,
            position_interp_rate: 5.0,
            wander_update_rate: 2.0,
            min_wander_distance: 50.0,
            wander_random_radius: 3000.0,
            wander_origin: Vec3::ZERO,
            boundary: BoundaryMode::Volume {
                bounds: Aabb::cube(Vec3::ZERO, 1000.0),
            },
            max_height: None,
            leader_mode: LeaderMode::PerPartition,
            threat_reaction: ThreatReaction::Flee,
            react_on_pawn: true,
            auto_add_obstacles: true,
            attack_radius: 100.0,
            damage_amount: 0.001,
            startup_jitter_secs: [0.05, 0.5],
            cooldown_secs: 0.0,
        }
    }
}

impl SimulationParameters {
    /// Magnitude shared by obstacle, boundary and height-ceiling escapes.
    pub fn escape_strength(&self) -> f32 {
        if self.escape_strength_offset <= 0.0 {
            return 0.0;
        }
        (self.enemy_awareness_radius / self.escape_strength_offset) * self.boundary_scale
    }

    pub fn bounds(&self) -> Option<&Aabb> {
        match &self.boundary {
            BoundaryMode::Volume { bounds } => Some(bounds),
            BoundaryMode::None => None,
        }
    }

    pub fn is_pursuing(&self) -> bool {
        matches!(self.threat_reaction, ThreatReaction::Pursue { .. })
    }

    pub fn can_attack(&self) -> bool {
        matches!(self.threat_reaction, ThreatReaction::Pursue { can_attack: true })
    }

    /// Upper bound on any agent's speed after a tick.
    ///
    /// Deliberately looser than `max(max_speed + jitter, max_speed * multiplier)`:
    /// the escape multiplier scales the already-jittered speed, so an escaping
    /// agent can reach `(max_speed + jitter) * multiplier`.
    pub fn speed_ceiling(&self) -> f32 {
        (self.max_speed + self.speed_jitter) * self.escape_speed_multiplier.max(1.0)
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        let scalars: [(&'static str, f32); 27] = [
            ("follow_scale", self.follow_scale),
            ("cohesion_scale", self.cohesion_scale),
            ("align_scale", self.align_scale),
            ("separation_scale", self.separation_scale),
            ("flee_scale", self.flee_scale),
            ("avoidance_scale", self.avoidance_scale),
            ("boundary_scale", self.boundary_scale),
            ("mate_awareness_radius", self.mate_awareness_radius),
            ("separation_radius", self.separation_radius),
            ("enemy_awareness_radius", self.enemy_awareness_radius),
            ("follow_pawn_awareness_radius", self.follow_pawn_awareness_radius),
            ("avoidance_primitive_distance", self.avoidance_primitive_distance),
            ("escape_strength_offset", self.escape_strength_offset),
            ("max_speed", self.max_speed),
            ("speed_jitter", self.speed_jitter),
            ("escape_speed_multiplier", self.escape_speed_multiplier),
            ("max_steering_force", self.max_steering_force),
            ("mate_rotation_rate", self.mate_rotation_rate),
            ("escape_rotation_rate", self.escape_rotation_rate),
            ("position_interp_rate", self.position_interp_rate),
            ("wander_update_rate", self.wander_update_rate),
            ("min_wander_distance", self.min_wander_distance),
            ("wander_random_radius", self.wander_random_radius),
            ("attack_radius", self.attack_radius),
            ("damage_amount", self.damage_amount),
            ("startup_jitter_min", self.startup_jitter_secs[0]),
            ("cooldown_secs", self.cooldown_secs),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(ParamError::NonFinite { name });
            }
            if value < 0.0 {
                return Err(ParamError::Negative { name });
            }
        }

        let [lo, hi] = self.startup_jitter_secs;
        if !hi.is_finite() || hi < lo {
            return Err(ParamError::InvalidStartupJitter(lo, hi));
        }
        if self.speed_jitter > self.max_speed {
            return Err(ParamError::JitterExceedsMaxSpeed {
                jitter: self.speed_jitter,
                max_speed: self.max_speed,
            });
        }
        if !self.wander_origin.is_finite() {
            return Err(ParamError::NonFinite {
                name: "wander_origin",
            });
        }
        if let Some(max_height) = self.max_height {
            if !max_height.is_finite() {
                return Err(ParamError::NonFinite { name: "max_height" });
            }
        }
        if let Some(bounds) = self.bounds() {
            if bounds.is_degenerate() {
                return Err(ParamError::DegenerateBoundary);
            }
        }
        Ok(())
    }
}
