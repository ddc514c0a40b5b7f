use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use flock_core::{AgentState, SimulationParameters, Transform, Vec3};
use flock_sim::{spawn_agents, FlockError, LeaderRegistry, SimulationWorker, WorkerState};

const TIMEOUT: Duration = Duration::from_secs(5);

fn params() -> SimulationParameters {
    SimulationParameters {
        startup_jitter_secs: [0.0, 0.0],
        cooldown_secs: 0.01,
        ..SimulationParameters::default()
    }
}

fn agents() -> Vec<AgentState> {
    spawn_agents((0..8).map(|i| {
        Transform::from_position(Vec3::new(i as f32 * 30.0, (i % 3) as f32 * 20.0, 0.0))
    }))
    .into_iter()
    .map(|a| a.with_velocity(Vec3::new(20.0, 5.0, 0.0)))
    .collect()
}

fn worker_with(params: SimulationParameters) -> SimulationWorker {
    SimulationWorker::new(0, agents(), Arc::new(params), Arc::new(LeaderRegistry::new(1)), 17)
}

fn wait_until(mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    done()
}

fn positions(agents: &[AgentState]) -> Vec<Vec3> {
    agents.iter().map(AgentState::position).collect()
}

fn max_offset(a: &[Vec3], b: &[Vec3]) -> f32 {
    a.iter().zip(b).map(|(p, q)| p.distance(*q)).fold(0.0, f32::max)
}

#[test]
fn unstarted_worker_publishes_its_initial_partition() {
    let mut worker = worker_with(params());
    assert_eq!(worker.state(), WorkerState::Idle);
    assert_eq!(worker.peek(), agents());
    assert_eq!(worker.ticks(), 0);

    worker.stop_and_join();
    assert_eq!(worker.state(), WorkerState::Stopped);
}

#[test]
fn worker_computes_one_tick_per_pull() {
    let mut worker = worker_with(params());
    worker.start().unwrap();

    assert!(wait_until(|| worker.ticks() >= 1 && worker.state() == WorkerState::Paused));
    thread::sleep(Duration::from_millis(50));
    assert_eq!(worker.ticks(), 1);

    worker.snapshot();
    assert!(wait_until(|| worker.ticks() >= 2));
    thread::sleep(Duration::from_millis(50));
    assert_eq!(worker.ticks(), 2);

    worker.stop_and_join();
}

#[test]
fn paused_worker_stops_advancing_until_resumed() {
    let mut worker = worker_with(params());
    worker.start().unwrap();
    assert!(wait_until(|| worker.ticks() >= 1));

    // Let the measured delta become non-zero.
    worker.snapshot();
    assert!(wait_until(|| worker.ticks() >= 2));

    worker.pause();
    assert!(wait_until(|| worker.state() == WorkerState::Paused));
    let first = positions(&worker.snapshot());
    thread::sleep(Duration::from_millis(50));
    let second = positions(&worker.snapshot());
    assert!(max_offset(&first, &second) < 1e-5);

    let held_at = worker.ticks();
    worker.resume();
    assert!(wait_until(|| worker.ticks() > held_at));
    let third = positions(&worker.peek());
    assert!(max_offset(&second, &third) > 1e-4);

    worker.stop_and_join();
}

#[test]
fn stopping_a_paused_worker_terminates_promptly() {
    let mut worker = worker_with(params());
    worker.start().unwrap();
    worker.pause();
    assert!(wait_until(|| worker.state() == WorkerState::Paused));

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        worker.stop_and_join();
        let _ = tx.send(worker.state());
    });

    let state = rx.recv_timeout(TIMEOUT).expect("worker did not stop in time");
    assert_eq!(state, WorkerState::Stopped);
}

#[test]
fn stop_interrupts_the_startup_sleep() {
    let slow = SimulationParameters {
        startup_jitter_secs: [30.0, 30.0],
        ..params()
    };
    let mut worker = worker_with(slow);
    worker.start().unwrap();

    let started = Instant::now();
    worker.stop_and_join();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(worker.ticks(), 0);
}

#[test]
fn snapshot_after_stop_returns_the_last_published_state() {
    let mut worker = worker_with(params());
    worker.start().unwrap();
    assert!(wait_until(|| worker.ticks() >= 1));
    worker.snapshot();
    assert!(wait_until(|| worker.ticks() >= 2));

    worker.stop_and_join();
    let ticks = worker.ticks();
    let last = worker.peek();

    assert_eq!(worker.snapshot(), last);
    assert_eq!(worker.snapshot(), last);
    assert_eq!(worker.ticks(), ticks);
}

#[test]
fn starting_twice_is_rejected() {
    let mut worker = worker_with(params());
    worker.start().unwrap();
    assert!(matches!(worker.start(), Err(FlockError::AlreadyStarted(0))));
    worker.stop_and_join();
}

#[test]
fn cooldown_is_added_to_the_measured_delta() {
    let slow = SimulationParameters {
        cooldown_secs: 0.02,
        ..params()
    };
    let mut worker = worker_with(slow);
    worker.start().unwrap();
    assert!(wait_until(|| worker.ticks() >= 1));
    worker.snapshot();
    assert!(wait_until(|| worker.ticks() >= 2));

    let stats = worker.stats();
    assert_eq!(stats.index, 0);
    assert_eq!(stats.agents, 8);
    assert_eq!(stats.ticks, 2);
    assert!(stats.last_tick_seconds >= 0.02);
    worker.stop_and_join();
}

#[test]
fn oversized_cooldown_still_stops_cleanly() {
    let endless = SimulationParameters {
        cooldown_secs: 1e30,
        ..params()
    };
    assert!(endless.validate().is_ok());
    let mut worker = worker_with(endless);
    worker.start().unwrap();
    assert!(wait_until(|| worker.ticks() >= 1));

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        worker.stop_and_join();
        let _ = tx.send((worker.state(), worker.ticks()));
    });

    let (state, ticks) = rx.recv_timeout(TIMEOUT).expect("worker did not stop in time");
    assert_eq!(state, WorkerState::Stopped);
    assert_eq!(ticks, 1);
}
