//! Splitting the population into fixed, disjoint worker partitions.

use flock_core::{AgentState, Transform};

use crate::{FlockError, Result};

/// Build initial agent state from spawner transforms.
///
/// `instance_index` is the position in `transforms`; agent 0 is flagged as the
/// candidate leader and [`crate::assign_leaders`] settles the final flags.
pub fn spawn_agents(transforms: impl IntoIterator<Item = Transform>) -> Vec<AgentState> {
    let mut agents: Vec<AgentState> = transforms
        .into_iter()
        .enumerate()
        .map(|(index, transform)| AgentState::new(index, transform))
        .collect();
    if let Some(first) = agents.first_mut() {
        first.is_leader = true;
    }
    agents
}

/// Slice sizes for `agent_count` agents over `thread_count` workers.
///
/// One slice when there are at least as many threads as agents; otherwise
/// `thread_count` equal slices with the last one absorbing the remainder.
pub fn partition_sizes(agent_count: usize, thread_count: usize) -> Vec<usize> {
    if agent_count == 0 || thread_count == 0 {
        return Vec::new();
    }
    if thread_count >= agent_count {
        return vec![agent_count];
    }
    let base = agent_count / thread_count;
    let mut sizes = vec![base; thread_count];
    if let Some(last) = sizes.last_mut() {
        *last += agent_count % thread_count;
    }
    sizes
}

/// Split `agents` into contiguous partitions, preserving order.
pub fn partition(agents: Vec<AgentState>, thread_count: usize) -> Result<Vec<Vec<AgentState>>> {
    if thread_count == 0 {
        return Err(FlockError::InvalidThreadCount(thread_count));
    }
    if agents.is_empty() {
        return Err(FlockError::EmptyPopulation);
    }

    let sizes = partition_sizes(agents.len(), thread_count);
    let mut rest = agents.into_iter();
    Ok(sizes
        .into_iter()
        .map(|size| rest.by_ref().take(size).collect())
        .collect())
}
