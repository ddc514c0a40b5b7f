use flock_core::neighbors::neighbors_within;
use flock_core::{AgentState, BruteForceNeighbors, NeighborQuery, Transform, Vec3};

fn line(count: usize, spacing: f32) -> Vec<AgentState> {
    (0..count)
        .map(|i| AgentState::new(i, Transform::from_position(Vec3::X * i as f32 * spacing)))
        .collect()
}

#[test]
fn excludes_self_and_uses_a_strict_radius() {
    let agents = line(5, 10.0);
    let found = neighbors_within(&BruteForceNeighbors, 2, &agents, 10.0);
    assert!(found.is_empty());

    let found = neighbors_within(&BruteForceNeighbors, 2, &agents, 10.5);
    assert_eq!(found, vec![1, 3]);
}

#[test]
fn results_come_back_in_partition_order() {
    let agents = line(6, 1.0);
    let found = neighbors_within(&BruteForceNeighbors, 5, &agents, 100.0);
    assert_eq!(found, vec![0, 1, 2, 3, 4]);
}

#[test]
fn out_of_range_index_and_zero_radius_yield_nothing() {
    let agents = line(3, 1.0);
    assert!(neighbors_within(&BruteForceNeighbors, 9, &agents, 100.0).is_empty());
    assert!(neighbors_within(&BruteForceNeighbors, 0, &agents, 0.0).is_empty());
}

#[test]
fn query_appends_to_the_caller_buffer() {
    let agents = line(3, 1.0);
    let mut out = vec![42];
    BruteForceNeighbors.neighbors_within(0, &agents, 1.5, &mut out);
    assert_eq!(out, vec![42, 1]);
}
