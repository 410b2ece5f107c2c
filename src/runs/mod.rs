//! Run lifecycle registry.

use std::path::PathBuf;

use dashmap::DashMap;

/// A logical test-execution session owning an artifact directory.
#[derive(Debug, Clone)]
pub struct RunState {
    pub run_id: String,
    pub artifact_dir: PathBuf,
}

/// Active runs keyed by run_id. `begin`/`end` are the only writers;
/// screenshot paths resolve through reads, so the map stays safe even if
/// request handling is ever parallelized.
#[derive(Default)]
pub struct RunRegistry {
    runs: DashMap<String, RunState>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a run. Re-registering an id replaces its artifact dir.
    pub fn begin(&self, run_id: &str, artifact_dir: PathBuf) -> RunState {
        let state = RunState {
            run_id: run_id.to_string(),
            artifact_dir,
        };
        self.runs.insert(run_id.to_string(), state.clone());
        state
    }

    /// Remove a run. Returns false when the id was never registered.
    pub fn end(&self, run_id: &str) -> bool {
        self.runs.remove(run_id).is_some()
    }

    pub fn get(&self, run_id: &str) -> Option<RunState> {
        self.runs.get(run_id).map(|entry| entry.value().clone())
    }

    pub fn artifact_dir(&self, run_id: &str) -> Option<PathBuf> {
        self.runs
            .get(run_id)
            .map(|entry| entry.value().artifact_dir.clone())
    }
}
