use crate::AgentState;

/// Pluggable neighbor lookup over one partition.
///
/// Implementations must exclude `index` itself and must only read `agents`,
/// which is the pre-tick snapshot of the partition.
pub trait NeighborQuery: Send + Sync {
    /// Append to `out` the indices of agents strictly closer than `radius` to
    /// `agents[index]`. Out-of-range `index` yields nothing.
    fn neighbors_within(&self, index: usize, agents: &[AgentState], radius: f32, out: &mut Vec<usize>);

    /// Human-readable name for logs.
    fn name(&self) -> &'static str;
}

/// Linear scan; O(n) per query, O(n^2) per partition tick.
///
/// Partitions are sized to a few thousand agents per worker, where the scan
/// stays cheap. A spatial hash can be dropped in behind [`NeighborQuery`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BruteForceNeighbors;

impl NeighborQuery for BruteForceNeighbors {
    fn neighbors_within(&self, index: usize, agents: &[AgentState], radius: f32, out: &mut Vec<usize>) {
        let Some(me) = agents.get(index) else {
            return;
        };
        if radius <= 0.0 {
            return;
        }
        let origin = me.position();
        let radius2 = radius * radius;
        for (j, other) in agents.iter().enumerate() {
            if j == index {
                continue;
            }
            if other.position().distance_squared(origin) < radius2 {
                out.push(j);
            }
        }
    }

    fn name(&self) -> &'static str {
        "BruteForce"
    }
}

/// Convenience wrapper returning a fresh vector.
pub fn neighbors_within<Q: NeighborQuery + ?Sized>(
    query: &Q,
    index: usize,
    agents: &[AgentState],
    radius: f32,
) -> Vec<usize> {
    let mut out = Vec::new();
    query.neighbors_within(index, agents, radius, &mut out);
    out
}
