//! Scripted sink shared by the dispatcher unit tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use contracts::{BulkSink, RenderedRow, SendError};

#[derive(Debug, Default)]
struct ScriptState {
    results: VecDeque<Result<(), SendError>>,
    batches: Vec<usize>,
    rows: Vec<RenderedRow>,
}

/// Sink that replays queued results (then accepts everything) and records
/// each batch it was handed
#[derive(Debug, Clone, Default)]
pub struct ScriptedSink {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap()
    }

    pub fn push_result(&self, result: Result<(), SendError>) {
        self.state().results.push_back(result);
    }

    pub fn send_count(&self) -> usize {
        self.state().batches.len()
    }

    /// Row count of every attempted batch, in order
    pub fn batches(&self) -> Vec<usize> {
        self.state().batches.clone()
    }

    /// Rows of accepted batches
    pub fn accepted_rows(&self) -> Vec<RenderedRow> {
        self.state().rows.clone()
    }
}

impl BulkSink for ScriptedSink {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send(&mut self, rows: &[RenderedRow]) -> Result<(), SendError> {
        let mut state = self.state();
        state.batches.push(rows.len());
        let result = state.results.pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            state.rows.extend_from_slice(rows);
        }
        result
    }
}
