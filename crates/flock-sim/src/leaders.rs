//! Leader election and the cross-partition leader registry.

use std::sync::{Mutex, PoisonError};

use flock_core::{AgentState, LeaderMode, Vec3};

/// Set the leader flags for `mode`.
///
/// - `SingleGlobal`: agent 0 of partition 0 only.
/// - `PerPartition`: agent 0 of every partition.
/// - `FollowActor`: nobody; followers seek the external follow target.
pub fn assign_leaders(partitions: &mut [Vec<AgentState>], mode: LeaderMode) {
    for (p, agents) in partitions.iter_mut().enumerate() {
        for (i, agent) in agents.iter_mut().enumerate() {
            agent.is_leader = match mode {
                LeaderMode::SingleGlobal => p == 0 && i == 0,
                LeaderMode::PerPartition => i == 0,
                LeaderMode::FollowActor => false,
            };
        }
    }
}

pub fn leader_count(partitions: &[Vec<AgentState>]) -> usize {
    partitions.iter().flatten().filter(|a| a.is_leader).count()
}

/// Position of a partition's leader, if it has one.
pub fn leader_position(agents: &[AgentState]) -> Option<Vec3> {
    agents.iter().find(|a| a.is_leader).map(AgentState::position)
}

/// Latest leader position of every partition.
///
/// Owned by the coordinator and shared with workers. Each worker writes only
/// its own slot after publishing a tick; in single-leader mode the other
/// workers read slot 0. Slots are locked individually so a read never tears.
#[derive(Debug, Default)]
pub struct LeaderRegistry {
    slots: Vec<Mutex<Option<Vec3>>>,
}

impl LeaderRegistry {
    pub fn new(partitions: usize) -> Self {
        Self {
            slots: (0..partitions).map(|_| Mutex::new(None)).collect(),
        }
    }

    /// Registry seeded with the pre-simulation leader positions.
    pub fn from_partitions(partitions: &[Vec<AgentState>]) -> Self {
        Self {
            slots: partitions
                .iter()
                .map(|agents| Mutex::new(leader_position(agents)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Out-of-range partitions are ignored.
    pub fn publish(&self, partition: usize, position: Option<Vec3>) {
        if let Some(slot) = self.slots.get(partition) {
            *slot.lock().unwrap_or_else(PoisonError::into_inner) = position;
        }
    }

    pub fn get(&self, partition: usize) -> Option<Vec3> {
        let slot = self.slots.get(partition)?;
        *slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The flock-wide leader used in single-leader mode.
    pub fn global(&self) -> Option<Vec3> {
        self.get(0)
    }
}
