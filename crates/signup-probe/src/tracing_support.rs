//! Action traces and filmstrips for failed attempts.
//!
//! Every base-page operation is recorded by an [`ExecutionTracer`] as a
//! [`TracedAction`]. When the artifact policy asks for it, the finished
//! [`TraceArchive`] is written as `trace.json` next to the attempt's
//! screenshot. A [`Filmstrip`] holds one viewport frame per action and stands
//! in for a video recording.

use crate::result::ProbeResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

/// Outcome of one traced action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionStatus {
    /// Action is running
    Running,
    /// Action completed
    Ok,
    /// Action failed
    Error,
}

/// One page operation as seen by the trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracedAction {
    /// Operation name (`fill`, `click`, `goto`, ...)
    pub name: String,
    /// Selector or URL the operation targeted
    pub target: Option<String>,
    /// Start timestamp (ms since trace start)
    pub start_ms: u64,
    /// Duration once finished
    pub duration_ms: Option<u64>,
    /// Action status
    pub status: ActionStatus,
    /// Error message for failed actions
    pub error: Option<String>,
}

/// Metadata for a trace archive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceMetadata {
    /// Trace ID
    pub trace_id: String,
    /// Test name
    pub test_name: String,
    /// Start time
    pub start_time: DateTime<Utc>,
    /// Total duration in ms
    pub duration_ms: Option<u64>,
    /// Number of actions
    pub action_count: usize,
    /// Crate version that produced the trace
    pub version: String,
}

impl TraceMetadata {
    /// Create new metadata
    #[must_use]
    pub fn new(test_name: &str) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string(),
            test_name: test_name.to_string(),
            start_time: Utc::now(),
            duration_ms: None,
            action_count: 0,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Complete trace archive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceArchive {
    /// Trace metadata
    pub metadata: TraceMetadata,
    /// All traced actions in issue order
    pub actions: Vec<TracedAction>,
}

impl TraceArchive {
    /// Save archive to JSON file
    pub fn save_json(&self, path: &Path) -> ProbeResult<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, json)?;
        Ok(())
    }

    /// Load archive from JSON file
    pub fn load_json(path: &Path) -> ProbeResult<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Get actions by name
    #[must_use]
    pub fn actions_by_name(&self, name: &str) -> Vec<&TracedAction> {
        self.actions.iter().filter(|a| a.name == name).collect()
    }

    /// Get failed actions
    #[must_use]
    pub fn failed_actions(&self) -> Vec<&TracedAction> {
        self.actions
            .iter()
            .filter(|a| a.status == ActionStatus::Error)
            .collect()
    }
}

/// Records the actions of one test attempt
#[derive(Debug)]
pub struct ExecutionTracer {
    start_time: Instant,
    metadata: TraceMetadata,
    actions: Vec<TracedAction>,
}

impl ExecutionTracer {
    /// Create a tracer for `test_name`
    #[must_use]
    pub fn new(test_name: &str) -> Self {
        Self {
            start_time: Instant::now(),
            metadata: TraceMetadata::new(test_name),
            actions: Vec::new(),
        }
    }

    /// Get elapsed time in milliseconds
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Begin an action, returning its handle
    pub fn begin(&mut self, name: &str, target: Option<String>) -> usize {
        self.actions.push(TracedAction {
            name: name.to_string(),
            target,
            start_ms: self.elapsed_ms(),
            duration_ms: None,
            status: ActionStatus::Running,
            error: None,
        });
        self.actions.len() - 1
    }

    /// Finish an action, marking it failed when `error` is set
    pub fn finish(&mut self, handle: usize, error: Option<String>) {
        let now = self.elapsed_ms();
        if let Some(action) = self.actions.get_mut(handle) {
            action.duration_ms = Some(now.saturating_sub(action.start_ms));
            action.status = if error.is_some() {
                ActionStatus::Error
            } else {
                ActionStatus::Ok
            };
            action.error = error;
        }
    }

    /// Number of recorded actions
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Snapshot the trace so far
    #[must_use]
    pub fn archive(&self) -> TraceArchive {
        let mut metadata = self.metadata.clone();
        metadata.duration_ms = Some(self.elapsed_ms());
        metadata.action_count = self.actions.len();
        TraceArchive {
            metadata,
            actions: self.actions.clone(),
        }
    }
}

/// One captured frame
#[derive(Debug, Clone)]
pub struct Frame {
    /// Action that preceded the frame
    pub action: String,
    /// Capture time (ms since trace start)
    pub elapsed_ms: u64,
    /// PNG bytes
    pub png: Vec<u8>,
}

/// Per-action viewport frames for one attempt
#[derive(Debug, Clone, Default)]
pub struct Filmstrip {
    frames: Vec<Frame>,
}

impl Filmstrip {
    /// Append a frame
    pub fn push(&mut self, action: &str, elapsed_ms: u64, png: Vec<u8>) {
        self.frames.push(Frame {
            action: action.to_string(),
            elapsed_ms,
            png,
        });
    }

    /// Captured frames
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Whether no frame was captured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Write frames as `frame-NNN-<action>.png` under `dir`
    pub fn save(&self, dir: &Path) -> ProbeResult<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        self.frames
            .iter()
            .enumerate()
            .map(|(i, frame)| {
                let path = dir.join(format!("frame-{i:03}-{}.png", frame.action));
                fs::write(&path, &frame.png)?;
                Ok(path)
            })
            .collect()
    }
}
