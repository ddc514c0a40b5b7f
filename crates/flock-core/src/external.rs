//! External inputs: obstacles and actors the flock reacts to.
//!
//! The core never detects these itself. Callers register handles exposing one
//! capability each (`ClosestPoint` or `Locate`), and a handle that returns
//! `None` is stale and is skipped for the rest of the tick.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use glam::Vec3;

use crate::{ActorId, Aabb, SimulationParameters};

/// Closest-point query against some world geometry.
pub trait ClosestPoint: Send + Sync {
    /// `None` when the underlying geometry no longer exists.
    fn closest_point(&self, point: Vec3) -> Option<Vec3>;
}

/// Position query for an actor.
pub trait Locate: Send + Sync {
    /// `None` when the actor no longer exists.
    fn position(&self) -> Option<Vec3>;
}

/// Sphere collision shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }
}

impl ClosestPoint for Sphere {
    fn closest_point(&self, point: Vec3) -> Option<Vec3> {
        let offset = point - self.center;
        let dist = offset.length();
        if dist <= self.radius {
            return Some(point);
        }
        Some(self.center + offset * (self.radius / dist))
    }
}

impl ClosestPoint for Aabb {
    fn closest_point(&self, point: Vec3) -> Option<Vec3> {
        Some(Aabb::closest_point(self, point))
    }
}

impl Locate for Vec3 {
    fn position(&self) -> Option<Vec3> {
        Some(*self)
    }
}

/// Shared, movable position; clones observe the same actor.
///
/// The owner moves it with [`TrackedPosition::set`] and marks it gone with
/// [`TrackedPosition::invalidate`].
#[derive(Debug, Clone, Default)]
pub struct TrackedPosition {
    inner: Arc<RwLock<Option<Vec3>>>,
}

impl TrackedPosition {
    pub fn new(position: Vec3) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(position))),
        }
    }

    pub fn set(&self, position: Vec3) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(position);
    }

    pub fn invalidate(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl Locate for TrackedPosition {
    fn position(&self) -> Option<Vec3> {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Obstacle the flock steers around.
#[derive(Clone)]
pub struct Obstacle {
    pub id: ActorId,
    pub shape: Arc<dyn ClosestPoint>,
}

impl Obstacle {
    pub fn new(id: ActorId, shape: impl ClosestPoint + 'static) -> Self {
        Self {
            id,
            shape: Arc::new(shape),
        }
    }
}

impl fmt::Debug for Obstacle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Obstacle").field("id", &self.id).finish()
    }
}

/// Position-queryable actor: a danger actor, or the designated follow target.
#[derive(Clone)]
pub struct ActorHandle {
    pub id: ActorId,
    pub source: Arc<dyn Locate>,
}

impl ActorHandle {
    pub fn new(id: ActorId, source: impl Locate + 'static) -> Self {
        Self {
            id,
            source: Arc::new(source),
        }
    }

    pub fn position(&self) -> Option<Vec3> {
        self.source.position()
    }
}

impl fmt::Debug for ActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorHandle").field("id", &self.id).finish()
    }
}

/// What a registered entity is, decided once by the caller at registration.
#[derive(Clone)]
pub enum EntityKind {
    Obstacle(Arc<dyn ClosestPoint>),
    Pawn(Arc<dyn Locate>),
}

/// Entity reported by the caller's overlap detection.
#[derive(Clone)]
pub struct ExternalEntity {
    pub id: ActorId,
    pub kind: EntityKind,
}

impl ExternalEntity {
    pub fn obstacle(id: ActorId, shape: impl ClosestPoint + 'static) -> Self {
        Self {
            id,
            kind: EntityKind::Obstacle(Arc::new(shape)),
        }
    }

    pub fn pawn(id: ActorId, source: impl Locate + 'static) -> Self {
        Self {
            id,
            kind: EntityKind::Pawn(Arc::new(source)),
        }
    }
}

impl fmt::Debug for ExternalEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            EntityKind::Obstacle(_) => "obstacle",
            EntityKind::Pawn(_) => "pawn",
        };
        f.debug_struct("ExternalEntity")
            .field("id", &self.id)
            .field("kind", &kind)
            .finish()
    }
}

/// Read-only external inputs for one refresh cycle. Workers replace their
/// copy wholesale; nothing here is mutated in place.
#[derive(Debug, Clone, Default)]
pub struct ExternalSnapshot {
    pub obstacles: Vec<Obstacle>,
    pub danger_actors: Vec<ActorHandle>,
    pub follow_target: Option<ActorHandle>,
}

impl ExternalSnapshot {
    pub fn new(obstacles: Vec<Obstacle>, danger_actors: Vec<ActorHandle>) -> Self {
        Self {
            obstacles,
            danger_actors,
            follow_target: None,
        }
    }

    pub fn with_follow_target(mut self, target: Option<ActorHandle>) -> Self {
        self.follow_target = target;
        self
    }

    /// Split registered entities into obstacles and danger actors.
    ///
    /// Pawns become danger actors only when `react_on_pawn` is set; obstacles
    /// are kept only when `auto_add_obstacles` is set. Duplicate pawn ids are
    /// collapsed.
    pub fn classify(entities: &[ExternalEntity], params: &SimulationParameters) -> Self {
        let mut snapshot = Self::default();
        for entity in entities {
            match &entity.kind {
                EntityKind::Obstacle(shape) => {
                    if params.auto_add_obstacles {
                        snapshot.obstacles.push(Obstacle {
                            id: entity.id,
                            shape: Arc::clone(shape),
                        });
                    }
                }
                EntityKind::Pawn(source) => {
                    if params.react_on_pawn
                        && !snapshot.danger_actors.iter().any(|d| d.id == entity.id)
                    {
                        snapshot.danger_actors.push(ActorHandle {
                            id: entity.id,
                            source: Arc::clone(source),
                        });
                    }
                }
            }
        }
        snapshot
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty() && self.danger_actors.is_empty() && self.follow_target.is_none()
    }
}
