#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Event records emitted as a simulation run moves through its stages.

use anyhow::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Generic event record encoded as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique identifier (`evt-<uuid>`).
    pub id: String,
    /// Module producing the event.
    pub source: String,
    /// Event type (e.g., `simulation.phishing.completed`).
    pub event_type: String,
    /// RFC 3339 timestamp.
    pub timestamp: String,
    /// Arbitrary JSON payload.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl EventRecord {
    /// Stamps a new event with a fresh id and the current time.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        event_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: format!("evt-{}", Uuid::new_v4()),
            source: source.into(),
            event_type: event_type.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            payload,
        }
    }
}

/// Event publisher interface.
pub trait EventPublisher: Send + Sync {
    /// Publishes an event.
    fn publish(&self, event: EventRecord) -> Result<()>;
}

/// In-memory bus keeping a bounded backlog (tests and local inspection).
#[derive(Debug, Clone)]
pub struct MemoryEventBus {
    capacity: usize,
    backlog: Arc<Mutex<VecDeque<EventRecord>>>,
}

impl MemoryEventBus {
    /// Creates a new bus retaining at most `capacity` events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            backlog: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
        }
    }

    /// Snapshot of retained events, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<EventRecord> {
        self.backlog.lock().iter().cloned().collect()
    }

    /// Retained events of the given type.
    #[must_use]
    pub fn of_type(&self, event_type: &str) -> Vec<EventRecord> {
        self.backlog
            .lock()
            .iter()
            .filter(|event| event.event_type == event_type)
            .cloned()
            .collect()
    }
}

impl EventPublisher for MemoryEventBus {
    fn publish(&self, event: EventRecord) -> Result<()> {
        let mut backlog = self.backlog.lock();
        backlog.push_back(event);
        while backlog.len() > self.capacity {
            backlog.pop_front();
        }
        Ok(())
    }
}

/// File-backed publisher appending JSON lines.
#[derive(Debug, Clone)]
pub struct FileEventPublisher {
    path: PathBuf,
}

impl FileEventPublisher {
    /// Creates a publisher for the given path, creating parent directories.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }
}

impl EventPublisher for FileEventPublisher {
    fn publish(&self, event: EventRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut data = serde_json::to_vec(&event)?;
        data.push(b'\n');
        file.write_all(&data)?;
        file.flush()?;
        Ok(())
    }
}
