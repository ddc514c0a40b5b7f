//! Per-tick, per-agent force composition.
//!
//! For each agent, in partition order:
//! - leaders only wander;
//! - followers gather follow/cohesion/align/separation forces;
//! - escape forces are evaluated in a fixed order (obstacles, boundary,
//!   height ceiling, threat flee) and the last one that triggers replaces
//!   the earlier ones;
//! - an active escape suppresses the social forces entirely;
//! - the clamped force turns the agent, then speed and position follow.
//!
//! Neighbor queries read a copy of the partition taken at tick start, so an
//! agent never sees positions already updated earlier in the same tick.

use glam::Vec3;

use crate::math::{clamp_length, forward, interp_rotation, interp_to, look_rotation};
use crate::neighbors::{BruteForceNeighbors, NeighborQuery};
use crate::steering;
use crate::{AgentState, DeterministicRng, ExternalSnapshot, SimulationParameters};

/// Escape vectors at or below this squared length leave social forces active.
const ESCAPE_SUPPRESS_THRESHOLD2: f32 = 0.1;

/// Counters for one partition pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepSummary {
    pub agents: usize,
    pub leaders: usize,
    pub escaping: usize,
    pub attacks: usize,
}

pub struct ForceComposer<'a, Q: NeighborQuery = BruteForceNeighbors> {
    params: &'a SimulationParameters,
    inputs: &'a ExternalSnapshot,
    follow_target: Option<Vec3>,
    query: Q,
}

impl<'a> ForceComposer<'a> {
    pub fn new(params: &'a SimulationParameters, inputs: &'a ExternalSnapshot) -> Self {
        Self {
            params,
            inputs,
            follow_target: None,
            query: BruteForceNeighbors,
        }
    }
}

impl<'a, Q: NeighborQuery> ForceComposer<'a, Q> {
    pub fn with_query<Q2: NeighborQuery>(self, query: Q2) -> ForceComposer<'a, Q2> {
        ForceComposer {
            params: self.params,
            inputs: self.inputs,
            follow_target: self.follow_target,
            query,
        }
    }

    /// Position followers seek this tick (leader or external follow actor).
    pub fn with_follow_target(mut self, target: Option<Vec3>) -> Self {
        self.follow_target = target;
        self
    }

    pub fn params(&self) -> &SimulationParameters {
        self.params
    }

    /// Advance every agent of `partition` by one tick of `dt_seconds`.
    pub fn step_partition<R: DeterministicRng>(
        &self,
        partition: &mut [AgentState],
        dt_seconds: f32,
        rng: &mut R,
    ) -> StepSummary {
        let snapshot = partition.to_vec();
        let mut mates = Vec::new();
        let mut summary = StepSummary {
            agents: partition.len(),
            ..StepSummary::default()
        };

        for (index, slot) in partition.iter_mut().enumerate() {
            let Some((next, escaping)) =
                self.compose_agent(index, &snapshot, dt_seconds, rng, &mut mates)
            else {
                continue;
            };
            summary.leaders += usize::from(next.is_leader);
            summary.escaping += usize::from(escaping);
            summary.attacks += next.threats_in_attack_range.len();
            *slot = next;
        }
        summary
    }

    /// Compute the next state of `snapshot[index]`. Returns the new state and
    /// whether an escape force was active, or `None` when `index` is out of
    /// range.
    ///
    /// `mates` is scratch space reused across agents.
    pub fn compose_agent<R: DeterministicRng>(
        &self,
        index: usize,
        snapshot: &[AgentState],
        dt_seconds: f32,
        rng: &mut R,
        mates: &mut Vec<usize>,
    ) -> Option<(AgentState, bool)> {
        let p = self.params;
        let mut agent = snapshot.get(index)?.clone();
        agent.threats_in_attack_range.clear();

        let position = agent.position();
        let mut steering_force = Vec3::ZERO;
        let mut is_avoidance = false;

        if agent.is_leader {
            steering_force += steering::wander(&mut agent, p, rng);
            agent.time_since_wander += dt_seconds;
        } else {
            let follow_vec = if p.follow_scale > 0.0 {
                steering::follow(&mut agent, self.follow_target, &self.inputs.danger_actors, p)
                    * p.follow_scale
            } else {
                Vec3::ZERO
            };

            mates.clear();
            self.query
                .neighbors_within(index, snapshot, p.mate_awareness_radius, mates);

            let cohesion_vec = if p.cohesion_scale > 0.0 {
                steering::cohesion(&agent, snapshot, mates) * p.cohesion_scale
            } else {
                Vec3::ZERO
            };
            let align_vec = if p.align_scale > 0.0 {
                steering::align(snapshot, mates) * p.align_scale
            } else {
                Vec3::ZERO
            };
            let separation_vec = if p.separation_scale > 0.0 {
                steering::separation(&agent, snapshot, mates, p.separation_radius)
                    * p.separation_scale
            } else {
                Vec3::ZERO
            };

            let heading = forward(agent.rotation());
            let escape = self.escape_vector(position, heading, &mut is_avoidance);
            steering_force += escape;
            if escape.length_squared() <= ESCAPE_SUPPRESS_THRESHOLD2 {
                steering_force += follow_vec + cohesion_vec + align_vec + separation_vec;
            }
        }

        let total = clamp_length(steering_force, 0.0, p.max_steering_force);
        let target_velocity = agent.velocity + total;

        let rotation_rate = if is_avoidance {
            p.escape_rotation_rate
        } else {
            p.mate_rotation_rate
        };
        if let Some(desired) = look_rotation(target_velocity) {
            agent.transform.rotation =
                interp_rotation(agent.rotation(), desired, dt_seconds, rotation_rate);
        }

        let mut velocity = forward(agent.rotation()) * target_velocity.length();
        if velocity.length() > p.max_speed {
            let speed = rng.next_f32_range(p.max_speed - p.speed_jitter, p.max_speed + p.speed_jitter);
            velocity = velocity.normalize_or_zero() * speed;
        }
        if is_avoidance {
            velocity *= p.escape_speed_multiplier;
        }
        agent.velocity = velocity;
        agent.transform.position =
            interp_to(position, position + velocity, dt_seconds, p.position_interp_rate);

        Some((agent, is_avoidance))
    }

    /// The single active escape vector, or zero.
    fn escape_vector(&self, position: Vec3, heading: Vec3, is_avoidance: &mut bool) -> Vec3 {
        let p = self.params;
        let strength = p.escape_strength();
        let mut escape = Vec3::ZERO;
        let mut take = |candidate: Vec3| {
            if candidate != Vec3::ZERO {
                escape = candidate;
                *is_avoidance = true;
            }
        };

        if p.avoidance_scale > 0.0 && !self.inputs.obstacles.is_empty() {
            take(
                steering::avoid_obstacles(
                    position,
                    heading,
                    &self.inputs.obstacles,
                    p.avoidance_primitive_distance,
                    strength,
                ) * p.avoidance_scale,
            );
        }
        if p.boundary_scale > 0.0 {
            if let Some(bounds) = p.bounds() {
                take(steering::avoid_boundary(position, bounds, strength) * p.boundary_scale);
            }
            if let Some(max_height) = p.max_height {
                take(steering::avoid_max_height(position, max_height, strength) * p.boundary_scale);
            }
        }
        if !p.is_pursuing() && p.flee_scale > 0.0 {
            take(
                steering::flee(
                    position,
                    &self.inputs.danger_actors,
                    p.enemy_awareness_radius,
                    p.flee_scale,
                ) * p.flee_scale,
            );
        }
        escape
    }
}
