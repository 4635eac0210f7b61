//! Emergency-vehicle event sources.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, SignalError};
use crate::types::EmergencyEvent;

/// Polled once per pipeline cycle.
pub trait EmergencySource: Send {
    /// Events that arrived since the previous poll.
    fn poll(&mut self) -> Result<Vec<EmergencyEvent>>;
}

/// Source for deployments without an emergency feed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEmergencies;

impl EmergencySource for NoEmergencies {
    fn poll(&mut self) -> Result<Vec<EmergencyEvent>> {
        Ok(Vec::new())
    }
}

/// Hands out one pre-recorded batch per poll, then nothing.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEmergencies {
    batches: VecDeque<Vec<EmergencyEvent>>,
}

impl ScriptedEmergencies {
    pub fn new(batches: impl IntoIterator<Item = Vec<EmergencyEvent>>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
        }
    }
}

impl EmergencySource for ScriptedEmergencies {
    fn poll(&mut self) -> Result<Vec<EmergencyEvent>> {
        Ok(self.batches.pop_front().unwrap_or_default())
    }
}

/// Reads a JSON array of events from a file whenever its modification time
/// changes.
///
/// A missing file and an unchanged file both poll as empty. A file that is not
/// a JSON array polls as empty and is not re-read until it changes again.
/// Entries that do not parse as an event are skipped.
#[derive(Debug, Clone)]
pub struct FileEmergencyBus {
    path: PathBuf,
    last_modified: Option<SystemTime>,
}

impl FileEmergencyBus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_modified: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_events(text: &str) -> Vec<EmergencyEvent> {
    let entries = match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(entries)) => entries,
        Ok(_) => {
            warn!("emergency feed is not a JSON array");
            return Vec::new();
        }
        Err(err) => {
            warn!(%err, "emergency feed is not valid JSON");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(event) => Some(event),
            Err(err) => {
                warn!(index, %err, "skipping malformed emergency entry");
                None
            }
        })
        .collect()
}

impl EmergencySource for FileEmergencyBus {
    fn poll(&mut self) -> Result<Vec<EmergencyEvent>> {
        let metadata = match std::fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(SignalError::io(&self.path, err)),
        };
        let modified = metadata
            .modified()
            .map_err(|e| SignalError::io(&self.path, e))?;
        if self.last_modified == Some(modified) {
            return Ok(Vec::new());
        }
        self.last_modified = Some(modified);

        let text = std::fs::read_to_string(&self.path).map_err(|e| SignalError::io(&self.path, e))?;
        let events = parse_events(&text);
        debug!(path = %self.path.display(), events = events.len(), "emergency feed reloaded");
        Ok(events)
    }
}
