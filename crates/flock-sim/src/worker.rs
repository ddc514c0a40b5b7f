//! One simulation thread owning one partition.
//!
//! Lifecycle: `Idle` until [`SimulationWorker::start`], then `Running` while
//! computing a tick and `Paused` while waiting, until `Stopped`.
//!
//! Pacing is pull-based. After publishing a tick the worker waits until a
//! new tick is requested, and [`SimulationWorker::snapshot`] is the request:
//! reading the published partition asks for the next one. An explicit
//! [`SimulationWorker::pause`] holds the worker regardless of pulls until
//! [`SimulationWorker::resume`].

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use flock_core::rng::derive_seed;
use flock_core::{
    AgentState, DeterministicRng, ExternalSnapshot, ForceComposer, LeaderMode,
    SimulationParameters, SplitMix64, StepSummary, TickContext, Vec3,
};
use serde::{Deserialize, Serialize};

use crate::leaders::{leader_position, LeaderRegistry};
use crate::{FlockError, Result, WorkerStats};

/// RNG stream used for the startup sleep; ticks use stream 0.
const STARTUP_STREAM: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Idle,
    Running,
    Paused,
    Stopped,
}

struct Control {
    state: WorkerState,
    /// Explicit pause; only `resume` clears it.
    held: bool,
    /// Set by a pull or a resume, consumed when a tick begins.
    tick_requested: bool,
    killed: bool,
}

struct Published {
    agents: Vec<AgentState>,
    ticks: u64,
    last_tick_seconds: f32,
    summary: StepSummary,
}

struct Shared {
    index: usize,
    control: Mutex<Control>,
    wake: Condvar,
    published: Mutex<Published>,
    inputs: Mutex<Arc<ExternalSnapshot>>,
    params: Mutex<Arc<SimulationParameters>>,
    leaders: Arc<LeaderRegistry>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct SimulationWorker {
    shared: Arc<Shared>,
    partition: Option<Vec<AgentState>>,
    seed: u64,
    handle: Option<JoinHandle<()>>,
}

impl SimulationWorker {
    pub fn new(
        index: usize,
        agents: Vec<AgentState>,
        params: Arc<SimulationParameters>,
        leaders: Arc<LeaderRegistry>,
        seed: u64,
    ) -> Self {
        let published = Published {
            agents: agents.clone(),
            ticks: 0,
            last_tick_seconds: 0.0,
            summary: StepSummary::default(),
        };
        let shared = Shared {
            index,
            control: Mutex::new(Control {
                state: WorkerState::Idle,
                held: false,
                tick_requested: true,
                killed: false,
            }),
            wake: Condvar::new(),
            published: Mutex::new(published),
            inputs: Mutex::new(Arc::new(ExternalSnapshot::default())),
            params: Mutex::new(params),
            leaders,
        };
        Self {
            shared: Arc::new(shared),
            partition: Some(agents),
            seed,
            handle: None,
        }
    }

    pub fn index(&self) -> usize {
        self.shared.index
    }

    pub fn state(&self) -> WorkerState {
        lock(&self.shared.control).state
    }

    /// Spawn the worker thread. The first tick runs after a random startup
    /// sleep drawn from `startup_jitter_secs`.
    pub fn start(&mut self) -> Result<()> {
        let index = self.shared.index;
        let Some(agents) = self.partition.take() else {
            tracing::warn!(worker = index, "start called twice");
            return Err(FlockError::AlreadyStarted(index));
        };
        let agent_count = agents.len();

        let shared = Arc::clone(&self.shared);
        let seed = self.seed;
        let spawned = thread::Builder::new()
            .name(format!("flock-worker-{index}"))
            .spawn(move || run(shared, agents, seed));

        let handle = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                lock(&self.shared.control).state = WorkerState::Stopped;
                return Err(FlockError::Spawn(err));
            }
        };
        self.handle = Some(handle);

        {
            let mut control = lock(&self.shared.control);
            if control.state == WorkerState::Idle {
                control.state = WorkerState::Running;
            }
        }
        tracing::info!(worker = index, agents = agent_count, "Worker spawned");
        Ok(())
    }

    /// Hold the worker. Takes effect at the top of its next iteration; a tick
    /// already in progress still completes and publishes.
    pub fn pause(&self) {
        let mut control = lock(&self.shared.control);
        if control.killed {
            return;
        }
        control.held = true;
        tracing::debug!(worker = self.shared.index, "Pause requested");
    }

    /// Release an explicit pause and request the next tick.
    pub fn resume(&self) {
        let mut control = lock(&self.shared.control);
        if control.killed {
            return;
        }
        control.held = false;
        control.tick_requested = true;
        self.shared.wake.notify_one();
    }

    /// Ask for one more tick without overriding an explicit pause.
    pub fn request_tick(&self) {
        let mut control = lock(&self.shared.control);
        if control.killed {
            return;
        }
        control.tick_requested = true;
        if !control.held {
            self.shared.wake.notify_one();
        }
    }

    /// Copy of the last published partition, and a request for the next tick.
    ///
    /// After `stop` this keeps returning the final published state.
    pub fn snapshot(&self) -> Vec<AgentState> {
        let agents = self.peek();
        if lock(&self.shared.control).killed {
            tracing::warn!(worker = self.shared.index, "Snapshot requested after stop");
        } else {
            self.request_tick();
        }
        agents
    }

    /// Copy of the last published partition, without requesting a tick.
    pub fn peek(&self) -> Vec<AgentState> {
        lock(&self.shared.published).agents.clone()
    }

    /// Number of ticks published so far.
    pub fn ticks(&self) -> u64 {
        lock(&self.shared.published).ticks
    }

    /// Replace the external inputs; picked up by the next tick.
    pub fn set_external_inputs(&self, inputs: Arc<ExternalSnapshot>) {
        *lock(&self.shared.inputs) = inputs;
    }

    /// Replace the parameter snapshot. Callers pause first so that no tick
    /// mixes old and new parameters across partitions.
    pub fn set_parameters(&self, params: Arc<SimulationParameters>) {
        *lock(&self.shared.params) = params;
    }

    pub fn stats(&self) -> WorkerStats {
        let state = self.state();
        let published = lock(&self.shared.published);
        WorkerStats {
            index: self.shared.index,
            state,
            ticks: published.ticks,
            last_tick_seconds: published.last_tick_seconds,
            agents: published.agents.len(),
            escaping: published.summary.escaping,
        }
    }

    /// Signal the thread to exit; wakes it if paused. Does not wait.
    pub fn stop(&self) {
        let mut control = lock(&self.shared.control);
        control.killed = true;
        control.held = false;
        if self.handle.is_none() {
            control.state = WorkerState::Stopped;
        }
        self.shared.wake.notify_all();
        tracing::debug!(worker = self.shared.index, "Stop requested");
    }

    /// Stop and wait for the thread to finish.
    pub fn stop_and_join(&mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!(worker = self.shared.index, "Worker thread panicked");
            }
        }
        lock(&self.shared.control).state = WorkerState::Stopped;
    }
}

impl Drop for SimulationWorker {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

fn run(shared: Arc<Shared>, mut agents: Vec<AgentState>, seed: u64) {
    let index = shared.index;

    let startup = {
        let params = lock(&shared.params).clone();
        let [lo, hi] = params.startup_jitter_secs;
        let mut rng = SplitMix64::new(derive_seed(seed, index as u64, STARTUP_STREAM));
        rng.next_f32_range(lo, hi)
    };
    if !rest(&shared, startup) {
        finish(&shared);
        return;
    }

    let mut tick: u64 = 0;
    let mut dt_seconds = 0.0f32;

    loop {
        {
            let mut control = lock(&shared.control);
            while !control.killed && (control.held || !control.tick_requested) {
                control.state = WorkerState::Paused;
                control = shared
                    .wake
                    .wait(control)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            if control.killed {
                break;
            }
            control.tick_requested = false;
            control.state = WorkerState::Running;
        }

        let params = lock(&shared.params).clone();
        let inputs = lock(&shared.inputs).clone();

        let started = Instant::now();
        let ctx = TickContext::new(tick, dt_seconds, seed);
        let mut rng = ctx.rng_for_partition(index, 0);
        let follow_target = follow_target(&shared, &params, &inputs, &agents);
        let summary = ForceComposer::new(&params, &inputs)
            .with_follow_target(follow_target)
            .step_partition(&mut agents, ctx.dt_seconds, &mut rng);

        shared.leaders.publish(index, leader_position(&agents));
        tick += 1;

        {
            let mut published = lock(&shared.published);
            published.agents.clone_from(&agents);
            published.ticks = tick;
            published.last_tick_seconds = ctx.dt_seconds;
            published.summary = summary;
        }
        dt_seconds = started.elapsed().as_secs_f32();

        if params.cooldown_secs > 0.0 {
            if !rest(&shared, params.cooldown_secs) {
                break;
            }
            dt_seconds += params.cooldown_secs;
        }
    }

    finish(&shared);
}

/// Seek target for followers this tick.
fn follow_target(
    shared: &Shared,
    params: &SimulationParameters,
    inputs: &ExternalSnapshot,
    agents: &[AgentState],
) -> Option<Vec3> {
    match params.leader_mode {
        LeaderMode::FollowActor => inputs.follow_target.as_ref().and_then(|t| t.position()),
        LeaderMode::PerPartition => leader_position(agents),
        LeaderMode::SingleGlobal => {
            leader_position(agents).or_else(|| shared.leaders.global())
        }
    }
}

/// Sleep for `seconds` unless stopped first. Returns `false` when stopped.
///
/// A length past what `Instant` can represent sleeps until stopped.
fn rest(shared: &Shared, seconds: f32) -> bool {
    let deadline = Duration::try_from_secs_f32(seconds.max(0.0))
        .ok()
        .and_then(|length| Instant::now().checked_add(length));
    let mut control = lock(&shared.control);
    loop {
        if control.killed {
            return false;
        }
        let Some(deadline) = deadline else {
            control = shared
                .wake
                .wait(control)
                .unwrap_or_else(PoisonError::into_inner);
            continue;
        };
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        control = shared
            .wake
            .wait_timeout(control, deadline - now)
            .unwrap_or_else(PoisonError::into_inner)
            .0;
    }
}

fn finish(shared: &Shared) {
    lock(&shared.control).state = WorkerState::Stopped;
    tracing::info!(worker = shared.index, "Worker exited");
}
