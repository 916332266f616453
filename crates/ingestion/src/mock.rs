//! Mock log source
//!
//! Scripted in-memory stand-in for Kafka, used by tests and local runs
//! without a broker. Clones share state so a test can keep a handle for
//! inspection after moving the source into the run loop.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use bytes::Bytes;
use contracts::{
    CommitError, HttpLogRecord, LogSource, PollOutcome, SourcePosition, SourceRecord,
};
use tracing::{debug, trace};

use crate::codec;

/// One scripted poll result
#[derive(Debug, Clone)]
enum MockEvent {
    /// Raw message, decoded on poll exactly as the Kafka source does
    Message {
        position: SourcePosition,
        payload: Option<Bytes>,
    },
    /// Client error surfaced by the poll
    Transport(String),
}

#[derive(Debug, Default)]
struct MockState {
    script: VecDeque<MockEvent>,
    next_offset: BTreeMap<i32, i64>,
    /// Highest offset handed out per partition
    consumed: BTreeMap<i32, i64>,
    /// Next offset to read per partition, as a committed group offset
    committed: BTreeMap<i32, i64>,
    polls: u64,
    commit_calls: u64,
    failing_commits: usize,
}

/// Mock log source
#[derive(Debug, Clone)]
pub struct MockLogSource {
    name: String,
    state: Arc<Mutex<MockState>>,
}

impl Default for MockLogSource {
    fn default() -> Self {
        Self::new("mock")
    }
}

impl MockLogSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Create a source preloaded with `records` on partition 0
    pub fn with_records(records: impl IntoIterator<Item = HttpLogRecord>) -> Self {
        let source = Self::default();
        for record in records {
            source.push_record(0, &record);
        }
        source
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push_message(&self, partition: i32, payload: Option<Bytes>) -> SourcePosition {
        let mut state = self.state();
        let offset = state.next_offset.entry(partition).or_insert(0);
        let position = SourcePosition::new(partition, *offset);
        *offset += 1;
        state
            .script
            .push_back(MockEvent::Message { position, payload });
        position
    }

    /// Queue an encoded record at the next offset of `partition`
    pub fn push_record(&self, partition: i32, record: &HttpLogRecord) -> SourcePosition {
        self.push_message(partition, Some(Bytes::from(codec::encode(record))))
    }

    /// Queue a raw payload (possibly undecodable)
    pub fn push_payload(&self, partition: i32, payload: impl Into<Bytes>) -> SourcePosition {
        self.push_message(partition, Some(payload.into()))
    }

    /// Queue a message without payload (tombstone)
    pub fn push_tombstone(&self, partition: i32) -> SourcePosition {
        self.push_message(partition, None)
    }

    /// Queue a poll error
    pub fn push_transport_error(&self, message: impl Into<String>) {
        self.state()
            .script
            .push_back(MockEvent::Transport(message.into()));
    }

    /// Make the next `count` commits fail
    pub fn fail_next_commits(&self, count: usize) {
        self.state().failing_commits = count;
    }

    /// Scripted events not yet polled
    pub fn pending(&self) -> usize {
        self.state().script.len()
    }

    /// Committed next-offset for `partition`
    pub fn committed(&self, partition: i32) -> Option<i64> {
        self.state().committed.get(&partition).copied()
    }

    pub fn commit_calls(&self) -> u64 {
        self.state().commit_calls
    }

    pub fn polls(&self) -> u64 {
        self.state().polls
    }
}

impl LogSource for MockLogSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn poll(&mut self, timeout: Duration) -> PollOutcome {
        let event = {
            let mut state = self.state();
            state.polls += 1;
            let event = state.script.pop_front();
            if let Some(MockEvent::Message { position, .. }) = &event {
                state.consumed.insert(position.partition, position.offset);
            }
            event
        };

        match event {
            Some(MockEvent::Message { position, payload }) => {
                let Some(payload) = payload else {
                    return PollOutcome::Malformed {
                        position: Some(position),
                        reason: "message has no payload".into(),
                    };
                };
                match codec::decode(&payload) {
                    Ok(record) => {
                        trace!(source = %self.name, %position, "mock record polled");
                        PollOutcome::Record(SourceRecord { record, position })
                    }
                    Err(e) => PollOutcome::Malformed {
                        position: Some(position),
                        reason: e.to_string(),
                    },
                }
            }
            Some(MockEvent::Transport(message)) => PollOutcome::Transport(message),
            None => {
                tokio::time::sleep(timeout).await;
                PollOutcome::Empty
            }
        }
    }

    async fn commit_current(&mut self) -> Result<(), CommitError> {
        let mut state = self.state();
        state.commit_calls += 1;

        if state.failing_commits > 0 {
            state.failing_commits -= 1;
            return Err(CommitError::new("scripted commit failure"));
        }

        let positions: Vec<(i32, i64)> = state
            .consumed
            .iter()
            .map(|(partition, offset)| (*partition, offset + 1))
            .collect();
        for (partition, next) in positions {
            state.committed.insert(partition, next);
        }

        debug!(source = %self.name, committed = ?state.committed, "mock offsets committed");
        Ok(())
    }
}
