//! Initial placement, standing in for the engine-side spawner.

use std::f32::consts::PI;

use flock_core::{DeterministicRng, Quat, Transform, Vec3};
use flock_sim::SpawnConfig;

/// `count` transforms uniformly inside the spawn sphere, with random heading
/// and a random uniform scale.
pub fn sphere<R: DeterministicRng>(spawn: &SpawnConfig, count: usize, rng: &mut R) -> Vec<Transform> {
    (0..count)
        .map(|_| {
            let offset = unit_ball(rng) * spawn.radius.max(0.0);
            let yaw = rng.next_f32_range(-PI, PI);
            let scale = rng.next_f32_range(spawn.min_scale, spawn.max_scale);
            Transform::from_position(spawn.center + offset)
                .with_rotation(Quat::from_rotation_z(yaw))
                .with_scale(scale)
        })
        .collect()
}

/// Rejection-sampled point in the unit ball.
fn unit_ball<R: DeterministicRng>(rng: &mut R) -> Vec3 {
    loop {
        let p = Vec3::new(
            rng.next_f32_range(-1.0, 1.0),
            rng.next_f32_range(-1.0, 1.0),
            rng.next_f32_range(-1.0, 1.0),
        );
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flock_core::SplitMix64;

    #[test]
    fn spawned_transforms_stay_inside_the_sphere() {
        let spawn = SpawnConfig {
            center: Vec3::new(10.0, -20.0, 300.0),
            radius: 50.0,
            min_scale: 0.5,
            max_scale: 2.0,
        };
        let mut rng = SplitMix64::new(1);
        let transforms = sphere(&spawn, 500, &mut rng);

        assert_eq!(transforms.len(), 500);
        for t in &transforms {
            assert!(t.position.distance(spawn.center) <= 50.0 + 1e-3);
            assert!(t.scale.x >= 0.5 && t.scale.x <= 2.0);
            assert!(t.rotation.is_normalized());
        }
    }

    #[test]
    fn same_seed_same_placement() {
        let spawn = SpawnConfig::default();
        let a = sphere(&spawn, 20, &mut SplitMix64::new(9));
        let b = sphere(&spawn, 20, &mut SplitMix64::new(9));
        assert_eq!(a, b);
    }
}
