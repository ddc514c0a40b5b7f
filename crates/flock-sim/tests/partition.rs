use flock_core::{Transform, Vec3};
use flock_sim::{partition, partition_sizes, spawn_agents, FlockError};

fn population(count: usize) -> Vec<flock_core::AgentState> {
    spawn_agents((0..count).map(|i| Transform::from_position(Vec3::new(i as f32, 0.0, 0.0))))
}

#[test]
fn thousand_agents_over_four_threads_split_evenly() {
    let agents = population(1000);
    let parts = partition(agents.clone(), 4).unwrap();

    assert_eq!(parts.len(), 4);
    assert!(parts.iter().all(|p| p.len() == 250));

    let joined: Vec<_> = parts.into_iter().flatten().collect();
    assert_eq!(joined, agents);
}

#[test]
fn remainder_lands_in_the_last_partition() {
    let parts = partition(population(1003), 4).unwrap();
    let sizes: Vec<usize> = parts.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![250, 250, 250, 253]);

    let mut seen: Vec<usize> = parts.iter().flatten().map(|a| a.instance_index).collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..1003).collect::<Vec<_>>());
}

#[test]
fn small_populations_use_a_single_partition() {
    let parts = partition(population(3), 8).unwrap();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].len(), 3);
    assert_eq!(partition_sizes(0, 4), Vec::<usize>::new());
}

#[test]
fn invalid_inputs_fail_fast() {
    assert!(matches!(
        partition(population(10), 0),
        Err(FlockError::InvalidThreadCount(0))
    ));
    assert!(matches!(
        partition(Vec::new(), 4),
        Err(FlockError::EmptyPopulation)
    ));
}

#[test]
fn spawned_agents_keep_their_instance_index_and_agent_zero_is_a_candidate() {
    let agents = population(5);
    for (i, agent) in agents.iter().enumerate() {
        assert_eq!(agent.instance_index, i);
        assert_eq!(agent.is_leader, i == 0);
        assert_eq!(agent.wander_target, agent.position());
    }
}
