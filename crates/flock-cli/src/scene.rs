//! External actors the flock reacts to: static sphere obstacles and danger
//! pawns moving at constant velocity.

use flock_core::{ActorId, ExternalEntity, Sphere, TrackedPosition, Vec3};
use flock_sim::FlockConfig;

struct Danger {
    id: ActorId,
    handle: TrackedPosition,
    position: Vec3,
    velocity: Vec3,
}

pub struct Scene {
    obstacles: Vec<(ActorId, Sphere)>,
    dangers: Vec<Danger>,
}

impl Scene {
    pub fn from_config(config: &FlockConfig) -> Self {
        let obstacles: Vec<(ActorId, Sphere)> = config
            .obstacles
            .iter()
            .enumerate()
            .map(|(i, o)| (ActorId(i as u64 + 1), Sphere::new(o.center, o.radius)))
            .collect();
        let first_danger = obstacles.len() as u64 + 1;
        let dangers = config
            .dangers
            .iter()
            .enumerate()
            .map(|(i, d)| Danger {
                id: ActorId(first_danger + i as u64),
                handle: TrackedPosition::new(d.position),
                position: d.position,
                velocity: d.velocity,
            })
            .collect();
        Self { obstacles, dangers }
    }

    /// Move every danger by `dt` seconds. Workers holding the handles see the
    /// new positions immediately.
    pub fn advance(&mut self, dt: f32) {
        for danger in &mut self.dangers {
            danger.position += danger.velocity * dt;
            danger.handle.set(danger.position);
        }
    }

    /// Registration list handed to the coordinator on each refresh.
    pub fn entities(&self) -> Vec<ExternalEntity> {
        let obstacles = self
            .obstacles
            .iter()
            .map(|(id, sphere)| ExternalEntity::obstacle(*id, *sphere));
        let dangers = self
            .dangers
            .iter()
            .map(|d| ExternalEntity::pawn(d.id, d.handle.clone()));
        obstacles.chain(dangers).collect()
    }

    pub fn danger_count(&self) -> usize {
        self.dangers.len()
    }
}
