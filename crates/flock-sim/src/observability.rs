//! Observability: worker stats and JSONL frame recording.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use flock_core::{ActorId, AgentState, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::WorkerState;

/// Point-in-time counters for one worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerStats {
    pub index: usize,
    pub state: WorkerState,
    pub ticks: u64,
    /// Delta that drove the last published tick: the measured compute time
    /// of the tick before it plus any cooldown.
    pub last_tick_seconds: f32,
    pub agents: usize,
    /// Agents with an escape force active in the last tick.
    pub escaping: usize,
}

/// One consumer-facing output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameEntry {
    pub instance_index: usize,
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: Vec3,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attacked_targets: Vec<ActorId>,
}

impl From<&AgentState> for FrameEntry {
    fn from(agent: &AgentState) -> Self {
        Self {
            instance_index: agent.instance_index,
            position: agent.transform.position,
            orientation: agent.transform.rotation,
            scale: agent.transform.scale,
            attacked_targets: agent.threats_in_attack_range.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRecord {
    pub timestamp: DateTime<Utc>,
    pub frame: u64,
    pub entries: Vec<FrameEntry>,
}

/// Appends collected frames to a JSON-lines file.
pub struct FrameRecorder {
    path: PathBuf,
}

impl FrameRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &FrameRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        let line = serde_json::to_string(record)?;
        writeln!(file, "{}", line)?;

        Ok(())
    }

    /// Record one frame stamped with the current time.
    pub fn record(&self, frame: u64, entries: Vec<FrameEntry>) -> Result<()> {
        self.append(&FrameRecord {
            timestamp: Utc::now(),
            frame,
            entries,
        })
    }

    /// Last `limit` readable records; unreadable lines are skipped.
    pub fn read_recent(&self, limit: usize) -> Vec<FrameRecord> {
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(_) => return Vec::new(),
        };

        let reader = BufReader::new(file);
        let mut records: Vec<FrameRecord> = reader
            .lines()
            .map_while(|line| line.ok())
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect();

        if records.len() > limit {
            records.drain(0..records.len() - limit);
        }

        records
    }
}
