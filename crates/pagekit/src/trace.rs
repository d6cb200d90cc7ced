//! Execution traces.
//!
//! An [`ExecutionTrace`] collects timestamped driver events for one test
//! attempt. [`crate::artifacts::RecordingBrowser`] feeds it; the runner
//! saves it as a [`TraceArchive`] JSON file when the trace policy asks for
//! one.

use crate::result::PageKitResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;
use uuid::Uuid;

/// What a traced event did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEventKind {
    /// Browser context opened
    NewContext,
    /// Page opened
    NewPage,
    /// Navigation started
    Navigate {
        /// Target URL
        url: String,
    },
    /// Locator resolved
    Query {
        /// Locator description
        locator: String,
        /// Number of matches
        matched: usize,
    },
    /// Element action performed
    Action {
        /// Locator description
        locator: String,
        /// Action verb
        action: String,
    },
    /// Page opened by another page
    Popup {
        /// URL of the new page
        url: String,
    },
    /// Screenshot taken
    Screenshot,
    /// Page or context closed
    Close,
}

/// One traced driver call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Milliseconds since the trace started
    pub at_ms: u64,
    /// Page or context the call went to
    pub target: String,
    /// What happened
    #[serde(flatten)]
    pub kind: TraceEventKind,
    /// Error message when the call failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Metadata of a saved trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceMetadata {
    /// Unique trace id
    pub trace_id: String,
    /// Full test title
    pub test: String,
    /// Attempt number, starting at 1
    pub attempt: u32,
    /// Wall-clock start
    pub started_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Library version that wrote the trace
    pub pagekit_version: String,
}

/// Serialized trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceArchive {
    /// Metadata
    pub metadata: TraceMetadata,
    /// Events in recording order
    pub events: Vec<TraceEvent>,
}

impl TraceArchive {
    /// Write as pretty JSON, creating parent directories
    ///
    /// # Errors
    ///
    /// I/O or serialization errors.
    pub fn save_json(&self, path: &Path) -> PageKitResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Read a trace written by [`Self::save_json`]
    ///
    /// # Errors
    ///
    /// I/O or deserialization errors.
    pub fn load_json(path: &Path) -> PageKitResult<Self> {
        Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
    }

    /// Events that failed
    #[must_use]
    pub fn errors(&self) -> Vec<&TraceEvent> {
        self.events.iter().filter(|e| e.error.is_some()).collect()
    }
}

/// Live trace for one test attempt
#[derive(Debug)]
pub struct ExecutionTrace {
    test: String,
    attempt: u32,
    started: Instant,
    started_at: DateTime<Utc>,
    events: Mutex<Vec<TraceEvent>>,
}

impl ExecutionTrace {
    /// Start a trace
    #[must_use]
    pub fn new(test: impl Into<String>, attempt: u32) -> Self {
        Self {
            test: test.into(),
            attempt,
            started: Instant::now(),
            started_at: Utc::now(),
            events: Mutex::new(Vec::new()),
        }
    }

    /// Append an event
    pub fn record(&self, target: &str, kind: TraceEventKind, error: Option<String>) {
        let event = TraceEvent {
            at_ms: crate::wait::millis(self.started.elapsed()),
            target: target.to_string(),
            kind,
            error,
        };
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    /// Number of recorded events
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().map_or(0, |e| e.len())
    }

    /// Whether nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot as an archive
    #[must_use]
    pub fn archive(&self) -> TraceArchive {
        TraceArchive {
            metadata: TraceMetadata {
                trace_id: Uuid::new_v4().to_string(),
                test: self.test.clone(),
                attempt: self.attempt,
                started_at: self.started_at,
                duration_ms: crate::wait::millis(self.started.elapsed()),
                pagekit_version: env!("CARGO_PKG_VERSION").to_string(),
            },
            events: self.events.lock().map(|e| e.clone()).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let trace = ExecutionTrace::new("student > leaderboard", 2);
        trace.record("page-1", TraceEventKind::Navigate { url: "https://x/".into() }, None);
        trace.record(
            "page-1",
            TraceEventKind::Action {
                locator: "locator(\"#go\")".into(),
                action: "click".into(),
            },
            Some("No element matches".into()),
        );
        let archive = trace.archive();
        assert_eq!(archive.metadata.attempt, 2);
        assert_eq!(archive.events.len(), 2);
        assert!(archive.events[0].at_ms <= archive.events[1].at_ms);
        assert_eq!(archive.errors().len(), 1);
    }

    #[test]
    fn test_json_shape_and_round_trip() {
        let trace = ExecutionTrace::new("t", 1);
        trace.record(
            "page-1",
            TraceEventKind::Query {
                locator: "get_by_text(\"x\")".into(),
                matched: 3,
            },
            None,
        );
        let archive = trace.archive();
        let json = serde_json::to_value(&archive).unwrap();
        assert_eq!(json["events"][0]["kind"], "query");
        assert_eq!(json["events"][0]["matched"], 3);
        assert!(json["events"][0].get("error").is_none());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/trace-1.json");
        archive.save_json(&path).unwrap();
        assert_eq!(TraceArchive::load_json(&path).unwrap(), archive);
    }
}
