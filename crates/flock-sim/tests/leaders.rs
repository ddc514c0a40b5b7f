use flock_core::{LeaderMode, Transform, Vec3};
use flock_sim::leaders::{leader_count, leader_position};
use flock_sim::{assign_leaders, partition, spawn_agents, LeaderRegistry};

fn partitions(count: usize, threads: usize) -> Vec<Vec<flock_core::AgentState>> {
    let agents = spawn_agents(
        (0..count).map(|i| Transform::from_position(Vec3::new(i as f32 * 10.0, 0.0, 0.0))),
    );
    partition(agents, threads).unwrap()
}

#[test]
fn single_global_mode_has_exactly_one_leader() {
    let mut parts = partitions(100, 4);
    for p in parts.iter_mut() {
        p[0].is_leader = true;
    }
    assign_leaders(&mut parts, LeaderMode::SingleGlobal);

    assert_eq!(leader_count(&parts), 1);
    assert!(parts[0][0].is_leader);
}

#[test]
fn per_partition_mode_elects_agent_zero_of_each_partition() {
    let mut parts = partitions(100, 4);
    assign_leaders(&mut parts, LeaderMode::PerPartition);

    assert_eq!(leader_count(&parts), 4);
    for p in &parts {
        assert!(p[0].is_leader);
        assert!(p[1..].iter().all(|a| !a.is_leader));
    }
}

#[test]
fn follow_actor_mode_has_no_leaders() {
    let mut parts = partitions(100, 4);
    assign_leaders(&mut parts, LeaderMode::FollowActor);
    assert_eq!(leader_count(&parts), 0);
}

#[test]
fn registry_is_seeded_from_partitions_and_ignores_bad_slots() {
    let mut parts = partitions(8, 2);
    assign_leaders(&mut parts, LeaderMode::PerPartition);
    let registry = LeaderRegistry::from_partitions(&parts);

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.global(), leader_position(&parts[0]));
    assert_eq!(registry.get(1), Some(Vec3::new(40.0, 0.0, 0.0)));

    registry.publish(1, Some(Vec3::Z));
    registry.publish(9, Some(Vec3::ONE));
    assert_eq!(registry.get(1), Some(Vec3::Z));
    assert_eq!(registry.get(9), None);
}
