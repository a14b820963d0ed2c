//! Diagnostic journal collaborator.
//!
//! The actor core reports named diagnostic entries through an injected
//! [`Journal`]. Sinks must not block the caller; persistence, if any, is the
//! sink's own business.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::info;

use crate::FrameId;

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct JournalEntry {
    pub at: DateTime<Utc>,
    pub frame: Option<FrameId>,
    pub event: String,
    pub details: String,
}

impl JournalEntry {
    pub fn new(
        frame: Option<&FrameId>,
        event: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            at: Utc::now(),
            frame: frame.cloned(),
            event: event.into(),
            details: details.into(),
        }
    }
}

pub trait Journal: Send + Sync {
    fn log(&self, entry: JournalEntry);

    fn record(&self, frame: &FrameId, event: &str, details: &str) {
        self.log(JournalEntry::new(Some(frame), event, details));
    }
}

impl<J> Journal for Arc<J>
where
    J: Journal + ?Sized,
{
    fn log(&self, entry: JournalEntry) {
        (**self).log(entry)
    }
}

/// Discards every entry.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullJournal;

impl Journal for NullJournal {
    fn log(&self, _entry: JournalEntry) {}
}

/// Forwards entries to the process log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingJournal;

impl Journal for TracingJournal {
    fn log(&self, entry: JournalEntry) {
        let frame = entry.frame.as_ref().map(|f| f.0.as_str()).unwrap_or("-");
        info!(target: "journal", frame = %frame, event = %entry.event, "{}", entry.details);
    }
}

/// Keeps entries in arrival order; suitable for tests and short-lived harnesses.
#[derive(Debug, Default)]
pub struct MemoryJournal {
    entries: Mutex<Vec<JournalEntry>>,
}

impl MemoryJournal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.lock().clone()
    }

    pub fn events(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|entry| entry.event.clone())
            .collect()
    }

    pub fn contains(&self, event: &str) -> bool {
        self.entries.lock().iter().any(|entry| entry.event == event)
    }
}

impl Journal for MemoryJournal {
    fn log(&self, entry: JournalEntry) {
        self.entries.lock().push(entry);
    }
}
