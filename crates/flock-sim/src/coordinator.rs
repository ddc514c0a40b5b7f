use std::sync::Arc;

use flock_core::{
    ActorHandle, AgentState, ExternalEntity, ExternalSnapshot, Obstacle, SimulationParameters,
    Transform,
};

use crate::leaders::{assign_leaders, leader_count, LeaderRegistry};
use crate::partition::{partition, spawn_agents};
use crate::{FrameEntry, Result, SimulationWorker, WorkerStats};

/// Owns the worker pool for one flock.
///
/// The consumer drives it from its own thread: refresh external inputs on its
/// own cadence and call [`FlockCoordinator::collect`] (or
/// [`FlockCoordinator::collect_frame`]) once per frame. Collecting never
/// blocks on a tick; it copies whatever each worker published last and asks
/// for the next tick.
pub struct FlockCoordinator {
    workers: Vec<SimulationWorker>,
    params: Arc<SimulationParameters>,
    leaders: Arc<LeaderRegistry>,
    inputs: Arc<ExternalSnapshot>,
    agent_count: usize,
    stopped: bool,
}

impl FlockCoordinator {
    /// Partition `agents` over `thread_count` workers and assign leaders.
    /// Workers are created but not started.
    pub fn new(
        agents: Vec<AgentState>,
        thread_count: usize,
        params: SimulationParameters,
        seed: u64,
    ) -> Result<Self> {
        params.validate()?;
        let agent_count = agents.len();
        let mut partitions = partition(agents, thread_count)?;
        assign_leaders(&mut partitions, params.leader_mode);

        tracing::info!(
            agents = agent_count,
            partitions = partitions.len(),
            leaders = leader_count(&partitions),
            leader_mode = ?params.leader_mode,
            "Flock partitioned"
        );

        let params = Arc::new(params);
        let leaders = Arc::new(LeaderRegistry::from_partitions(&partitions));
        let workers = partitions
            .into_iter()
            .enumerate()
            .map(|(index, agents)| {
                SimulationWorker::new(
                    index,
                    agents,
                    Arc::clone(&params),
                    Arc::clone(&leaders),
                    seed,
                )
            })
            .collect();

        Ok(Self {
            workers,
            params,
            leaders,
            inputs: Arc::new(ExternalSnapshot::default()),
            agent_count,
            stopped: false,
        })
    }

    /// [`FlockCoordinator::new`] from spawner transforms.
    pub fn from_transforms(
        transforms: impl IntoIterator<Item = Transform>,
        thread_count: usize,
        params: SimulationParameters,
        seed: u64,
    ) -> Result<Self> {
        Self::new(spawn_agents(transforms), thread_count, params, seed)
    }

    /// Start every worker. On failure the already-started ones are stopped.
    pub fn start(&mut self) -> Result<()> {
        for i in 0..self.workers.len() {
            if let Err(err) = self.workers[i].start() {
                self.stop();
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn agent_count(&self) -> usize {
        self.agent_count
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn leaders(&self) -> &LeaderRegistry {
        &self.leaders
    }

    pub fn external_inputs(&self) -> &ExternalSnapshot {
        &self.inputs
    }

    /// Replace obstacles and danger actors on every worker; the follow target
    /// is kept.
    pub fn broadcast_external_inputs(&mut self, obstacles: Vec<Obstacle>, danger_actors: Vec<ActorHandle>) {
        let snapshot = ExternalSnapshot::new(obstacles, danger_actors)
            .with_follow_target(self.inputs.follow_target.clone());
        self.publish_inputs(snapshot);
    }

    /// Classify caller-registered entities and broadcast them.
    pub fn refresh_external(&mut self, entities: &[ExternalEntity]) {
        let snapshot = ExternalSnapshot::classify(entities, &self.params)
            .with_follow_target(self.inputs.follow_target.clone());
        self.publish_inputs(snapshot);
    }

    /// Actor that followers seek in follow-actor mode.
    pub fn set_follow_target(&mut self, target: Option<ActorHandle>) {
        let snapshot = ExternalSnapshot::clone(&self.inputs).with_follow_target(target);
        self.publish_inputs(snapshot);
    }

    fn publish_inputs(&mut self, snapshot: ExternalSnapshot) {
        tracing::debug!(
            obstacles = snapshot.obstacles.len(),
            dangers = snapshot.danger_actors.len(),
            follow_target = snapshot.follow_target.is_some(),
            "External inputs refreshed"
        );
        self.inputs = Arc::new(snapshot);
        for worker in &self.workers {
            worker.set_external_inputs(Arc::clone(&self.inputs));
        }
    }

    /// Swap the parameter snapshot: pause all, replace, resume all.
    ///
    /// Leader flags are fixed at construction, so `leader_mode` keeps the
    /// value the flock was built with.
    pub fn update_parameters(&mut self, mut params: SimulationParameters) -> Result<()> {
        params.validate()?;
        if params.leader_mode != self.params.leader_mode {
            tracing::warn!(
                current = ?self.params.leader_mode,
                requested = ?params.leader_mode,
                "Leader mode cannot change during a run; keeping the current mode"
            );
            params.leader_mode = self.params.leader_mode;
        }

        self.pause_all();
        self.params = Arc::new(params);
        for worker in &self.workers {
            worker.set_parameters(Arc::clone(&self.params));
        }
        self.resume_all();

        tracing::debug!("Simulation parameters swapped");
        Ok(())
    }

    /// Latest published state of every partition, concatenated in partition
    /// order, and a request for the next tick on every worker.
    ///
    /// Positional order is not `instance_index` order.
    pub fn collect(&self) -> Vec<AgentState> {
        let mut out = Vec::with_capacity(self.agent_count);
        for worker in &self.workers {
            out.extend(worker.snapshot());
        }
        out
    }

    pub fn collect_frame(&self) -> Vec<FrameEntry> {
        self.collect().iter().map(FrameEntry::from).collect()
    }

    pub fn stats(&self) -> Vec<WorkerStats> {
        self.workers.iter().map(SimulationWorker::stats).collect()
    }

    pub fn pause_all(&self) {
        for worker in &self.workers {
            worker.pause();
        }
    }

    pub fn resume_all(&self) {
        for worker in &self.workers {
            worker.resume();
        }
    }

    /// Signal every worker, then join them all.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        for worker in &self.workers {
            worker.stop();
        }
        for worker in &mut self.workers {
            worker.stop_and_join();
        }
        tracing::info!(workers = self.workers.len(), "Flock stopped");
    }
}

impl Drop for FlockCoordinator {
    fn drop(&mut self) {
        self.stop();
    }
}
