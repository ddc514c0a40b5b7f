//! Vector helpers shared by the steering library and the composer.
//!
//! Axis convention: X is forward, Z is up.

use glam::{Quat, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::DeterministicRng;

/// Squared lengths below this are treated as zero.
pub const SMALL_NUMBER: f32 = 1e-8;

/// Clamp the length of `v` into `[min_len, max_len]`, keeping its direction.
///
/// A zero vector stays zero; it has no direction to stretch along.
pub fn clamp_length(v: Vec3, min_len: f32, max_len: f32) -> Vec3 {
    let max_len = max_len.max(0.0);
    let min_len = min_len.clamp(0.0, max_len);
    let len2 = v.length_squared();
    if len2 <= SMALL_NUMBER {
        return Vec3::ZERO;
    }
    let len = len2.sqrt();
    if len > max_len {
        v * (max_len / len)
    } else if len < min_len {
        v * (min_len / len)
    } else {
        v
    }
}

/// Rotation whose forward (X) axis points along `dir`, with no roll.
///
/// Returns `None` for a (near) zero direction.
pub fn look_rotation(dir: Vec3) -> Option<Quat> {
    if dir.length_squared() <= SMALL_NUMBER {
        return None;
    }
    let dir = dir.normalize();
    let yaw = dir.y.atan2(dir.x);
    let pitch = dir.z.atan2((dir.x * dir.x + dir.y * dir.y).sqrt());
    Some(Quat::from_rotation_z(yaw) * Quat::from_rotation_y(-pitch))
}

/// Forward (X) axis of a rotation.
pub fn forward(rotation: Quat) -> Vec3 {
    (rotation * Vec3::X).normalize_or_zero()
}

/// Exponentially smooth `current` toward `target`.
///
/// The step is `clamp(dt * rate, 0, 1)` of the remaining arc, so the motion
/// depends on the measured delta rather than a fixed step. A non-positive rate
/// snaps to the target.
pub fn interp_rotation(current: Quat, target: Quat, dt: f32, rate: f32) -> Quat {
    if rate <= 0.0 {
        return target;
    }
    if dt <= 0.0 {
        return current;
    }
    let alpha = (dt * rate).clamp(0.0, 1.0);
    current.slerp(target, alpha).normalize()
}

/// Exponentially smooth a point toward `target`; same policy as [`interp_rotation`].
pub fn interp_to(current: Vec3, target: Vec3, dt: f32, rate: f32) -> Vec3 {
    if rate <= 0.0 {
        return target;
    }
    if dt <= 0.0 {
        return current;
    }
    let delta = target - current;
    if delta.length_squared() <= SMALL_NUMBER {
        return target;
    }
    current + delta * (dt * rate).clamp(0.0, 1.0)
}

/// Axis-aligned box given by its center and half extents.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl Aabb {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents: half_extents.abs(),
        }
    }

    /// Cube of side `2 * half_extent` around `center`.
    pub fn cube(center: Vec3, half_extent: f32) -> Self {
        Self::new(center, Vec3::splat(half_extent))
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Vec3) -> bool {
        let d = (point - self.center).abs();
        d.x <= self.half_extents.x && d.y <= self.half_extents.y && d.z <= self.half_extents.z
    }

    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min(), self.max())
    }

    /// Uniform random point inside the box.
    pub fn random_point<R: DeterministicRng>(&self, rng: &mut R) -> Vec3 {
        let min = self.min();
        let max = self.max();
        Vec3::new(
            rng.next_f32_range(min.x, max.x),
            rng.next_f32_range(min.y, max.y),
            rng.next_f32_range(min.z, max.z),
        )
    }

    pub fn is_degenerate(&self) -> bool {
        !self.center.is_finite()
            || !self.half_extents.is_finite()
            || self.half_extents.min_element() <= 0.0
    }
}
