use flock_core::{ActorId, AgentState, Quat, Transform, Vec3};
use flock_sim::{FrameEntry, FrameRecorder};
use tempfile::TempDir;

fn entry(index: usize) -> FrameEntry {
    let mut agent = AgentState::new(
        index,
        Transform::from_position(Vec3::new(index as f32, 1.0, 2.0)).with_scale(1.5),
    );
    agent.threats_in_attack_range.push(ActorId(9));
    FrameEntry::from(&agent)
}

#[test]
fn frame_entry_carries_render_fields() {
    let e = entry(3);
    assert_eq!(e.instance_index, 3);
    assert_eq!(e.position, Vec3::new(3.0, 1.0, 2.0));
    assert_eq!(e.orientation, Quat::IDENTITY);
    assert_eq!(e.scale, Vec3::splat(1.5));
    assert_eq!(e.attacked_targets, vec![ActorId(9)]);
}

#[test]
fn recorder_appends_and_reads_back_the_most_recent_frames() {
    let dir = TempDir::new().unwrap();
    let recorder = FrameRecorder::new(dir.path().join("frames/run.jsonl"));

    for frame in 0..3u64 {
        recorder.record(frame, vec![entry(frame as usize)]).unwrap();
    }

    let recent = recorder.read_recent(2);
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].frame, 1);
    assert_eq!(recent[1].frame, 2);
    assert_eq!(recent[1].entries[0], entry(2));
}

#[test]
fn reading_a_missing_log_yields_nothing() {
    let dir = TempDir::new().unwrap();
    let recorder = FrameRecorder::new(dir.path().join("none.jsonl"));
    assert!(recorder.read_recent(10).is_empty());
}
