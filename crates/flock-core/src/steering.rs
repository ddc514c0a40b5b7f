//! Individual steering forces.
//!
//! Each function returns one force vector. Only [`wander`] and [`follow`]
//! touch the agent: `wander` may reset the wander target and timer, and
//! `follow` records danger actors in attack range.

use glam::Vec3;

use crate::math::SMALL_NUMBER;
use crate::params::WANDER_HEIGHT_MARGIN;
use crate::{Aabb, ActorHandle, AgentState, DeterministicRng, Obstacle, SimulationParameters};

/// Head for the current wander target, picking a new one when the timer
/// expires or the target is reached.
///
/// The caller advances `time_since_wander` after this call.
pub fn wander<R: DeterministicRng>(
    agent: &mut AgentState,
    params: &SimulationParameters,
    rng: &mut R,
) -> Vec3 {
    let to_target = agent.wander_target - agent.position();
    if agent.time_since_wander >= params.wander_update_rate
        || to_target.length() <= params.min_wander_distance
    {
        agent.wander_target = random_wander_target(params, rng);
        agent.time_since_wander = 0.0;
        return agent.wander_target - agent.position();
    }
    to_target
}

/// Uniform point in the boundary volume, or within `wander_random_radius` of
/// `wander_origin` when unbounded, lowered under the height ceiling if any.
pub fn random_wander_target<R: DeterministicRng>(params: &SimulationParameters, rng: &mut R) -> Vec3 {
    let mut target = match params.bounds() {
        Some(bounds) => bounds.random_point(rng),
        None => {
            let r = params.wander_random_radius;
            params.wander_origin
                + Vec3::new(
                    rng.next_f32_range(-r, r),
                    rng.next_f32_range(-r, r),
                    rng.next_f32_range(-r, r),
                )
        }
    };
    if let Some(max_height) = params.max_height {
        if target.z >= max_height {
            target.z = max_height - WANDER_HEIGHT_MARGIN;
        }
    }
    target
}

/// Average velocity of the mates.
pub fn align(agents: &[AgentState], mates: &[usize]) -> Vec3 {
    let mut sum = Vec3::ZERO;
    let mut count = 0usize;
    for other in mates.iter().filter_map(|&j| agents.get(j)) {
        sum += other.velocity;
        count += 1;
    }
    if count == 0 {
        return Vec3::ZERO;
    }
    sum / count as f32
}

/// Offset from the agent to the mates' average position.
pub fn cohesion(agent: &AgentState, agents: &[AgentState], mates: &[usize]) -> Vec3 {
    let mut sum = Vec3::ZERO;
    let mut count = 0usize;
    for other in mates.iter().filter_map(|&j| agents.get(j)) {
        sum += other.position();
        count += 1;
    }
    if count == 0 {
        return Vec3::ZERO;
    }
    sum / count as f32 - agent.position()
}

/// Repulsion from each mate with magnitude `separation_radius / distance`.
///
/// Coincident mates contribute nothing.
pub fn separation(
    agent: &AgentState,
    agents: &[AgentState],
    mates: &[usize],
    separation_radius: f32,
) -> Vec3 {
    let mut force = Vec3::ZERO;
    for other in mates.iter().filter_map(|&j| agents.get(j)) {
        let away = agent.position() - other.position();
        let dist2 = away.length_squared();
        if dist2 <= SMALL_NUMBER {
            continue;
        }
        let dist = dist2.sqrt();
        force += (away / dist) * (separation_radius / dist);
    }
    force
}

/// Run from every danger actor inside `awareness_radius`, harder the closer
/// it is. Stale handles are skipped.
pub fn flee(position: Vec3, threats: &[ActorHandle], awareness_radius: f32, scale: f32) -> Vec3 {
    let mut force = Vec3::ZERO;
    for threat in threats {
        let Some(threat_pos) = threat.position() else {
            continue;
        };
        let away = position - threat_pos;
        let dist2 = away.length_squared();
        if dist2 <= SMALL_NUMBER {
            continue;
        }
        let dist = dist2.sqrt();
        if dist < awareness_radius {
            force += (away / dist) * ((awareness_radius / dist) * scale);
        }
    }
    force
}

/// Classic seek: desired velocity toward `target` at `max_speed`, minus the
/// current velocity.
pub fn seek(position: Vec3, velocity: Vec3, target: Vec3, max_speed: f32) -> Vec3 {
    (target - position).normalize_or_zero() * max_speed - velocity
}

/// Seek the leader or follow target.
///
/// In pursue mode the nearest danger actor within
/// `follow_pawn_awareness_radius` overrides the target, and (when attacking
/// is enabled) every danger actor within `attack_radius` is recorded on the
/// agent. Without any target the force is zero.
pub fn follow(
    agent: &mut AgentState,
    target: Option<Vec3>,
    threats: &[ActorHandle],
    params: &SimulationParameters,
) -> Vec3 {
    let position = agent.position();

    if params.is_pursuing() {
        let attack_radius2 = params.attack_radius * params.attack_radius;
        let mut nearest: Option<(f32, Vec3)> = None;
        for threat in threats {
            let Some(threat_pos) = threat.position() else {
                continue;
            };
            let dist = threat_pos.distance(position);
            if dist >= params.follow_pawn_awareness_radius {
                continue;
            }
            if nearest.map_or(true, |(best, _)| dist < best) {
                nearest = Some((dist, threat_pos));
            }
            if params.can_attack() && threat_pos.distance_squared(position) < attack_radius2 {
                agent.mark_threat(threat.id);
            }
        }
        if let Some((_, prey)) = nearest {
            return seek(position, agent.velocity, prey, params.max_speed);
        }
    }

    match target {
        Some(target) => seek(position, agent.velocity, target, params.max_speed),
        None => Vec3::ZERO,
    }
}

/// Push away from one obstacle whose closest point is nearer than
/// `distance_threshold`. `None` when the obstacle does not trigger or its
/// handle is stale.
///
/// An agent inside or touching the shape has no offset to push along, so it
/// escapes along `heading` instead (X when `heading` is zero).
pub fn avoid_obstacle(
    position: Vec3,
    heading: Vec3,
    obstacle: &Obstacle,
    distance_threshold: f32,
    strength: f32,
) -> Option<Vec3> {
    let closest = obstacle.shape.closest_point(position)?;
    let away = position - closest;
    if away.length() >= distance_threshold {
        return None;
    }
    let dir = away
        .try_normalize()
        .or_else(|| heading.try_normalize())
        .unwrap_or(Vec3::X);
    Some(dir * strength)
}

/// Obstacle escape over the whole list; the last triggering obstacle wins.
pub fn avoid_obstacles(
    position: Vec3,
    heading: Vec3,
    obstacles: &[Obstacle],
    distance_threshold: f32,
    strength: f32,
) -> Vec3 {
    obstacles
        .iter()
        .filter_map(|o| avoid_obstacle(position, heading, o, distance_threshold, strength))
        .last()
        .unwrap_or(Vec3::ZERO)
}

/// Head back to the volume center when outside it.
pub fn avoid_boundary(position: Vec3, bounds: &Aabb, strength: f32) -> Vec3 {
    if bounds.contains(position) {
        return Vec3::ZERO;
    }
    (bounds.center - position).normalize_or_zero() * strength
}

/// Dive back under the ceiling when at or above it.
pub fn avoid_max_height(position: Vec3, max_height: f32, strength: f32) -> Vec3 {
    if position.z < max_height {
        return Vec3::ZERO;
    }
    let below = Vec3::new(position.x, position.y, max_height);
    let dir = (below - position).try_normalize().unwrap_or(Vec3::NEG_Z);
    dir * strength
}
