use std::path::Path;

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use bounty_model::{ActorId, EventId};

use crate::canonical::{content_hash, verify_hash};
use crate::types::{AuditAction, AuditError, AuditResult, EntityType, Event};

/// Append-only audit event log.
///
/// The API exposes no update or delete path: once appended, an event can
/// only be read. Services wanting concurrent access wrap the log in
/// `Arc<RwLock<EventLog>>` and append under the write guard; within one
/// entity's trail, append order is causal order.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<Event>,
    next_id: EventId,
}

impl EventLog {
    /// Create an empty log. Ids start at 1.
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Append one event, assigning the next id and the current timestamp.
    ///
    /// If `snapshot` is given, its canonical content hash is computed and
    /// stored so the snapshot can later be verified against the record.
    /// Returns a reference to the stored event.
    pub fn append(
        &mut self,
        actor: &ActorId,
        entity_type: EntityType,
        entity_id: u64,
        action: AuditAction,
        snapshot: Option<&Value>,
        metadata: Option<Value>,
    ) -> &Event {
        let event = Event {
            id: self.next_id,
            actor: actor.clone(),
            entity_type,
            entity_id,
            action,
            content_hash: snapshot.map(content_hash),
            metadata,
            created_at: Utc::now(),
        };
        self.next_id += 1;

        debug!(
            event_id = event.id,
            %entity_type,
            entity_id,
            %action,
            hashed = event.content_hash.is_some(),
            "audit event appended"
        );

        self.events.push(event);
        self.events.last().unwrap()
    }

    /// The complete chronological trail (oldest first) for one entity.
    pub fn trail(&self, entity_type: EntityType, entity_id: u64) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| e.entity_type == entity_type && e.entity_id == entity_id)
            .cloned()
            .collect()
    }

    /// The most recent events emitted by an actor, newest first.
    pub fn by_actor(&self, actor: &str, limit: usize) -> Vec<Event> {
        self.events
            .iter()
            .rev()
            .filter(|e| e.actor == actor)
            .take(limit)
            .cloned()
            .collect()
    }

    /// System-wide recent events, newest first.
    pub fn recent(&self, limit: usize) -> Vec<Event> {
        self.events.iter().rev().take(limit).cloned().collect()
    }

    /// Number of events ever appended.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Persist the log as pretty JSON.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> AuditResult<()> {
        let json = serde_json::to_string_pretty(&self.events)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a previously persisted log.
    ///
    /// Ids must be strictly increasing — an out-of-order or duplicated id
    /// means the file was edited and the load fails with `Corrupt` rather
    /// than silently accepting a rewritten history.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AuditResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let events: Vec<Event> = serde_json::from_str(&contents)?;

        let mut last_id = 0;
        for event in &events {
            if event.id <= last_id {
                return Err(AuditError::Corrupt(format!(
                    "event id {} not strictly increasing (previous {})",
                    event.id, last_id
                )));
            }
            last_id = event.id;
        }

        let next_id = last_id + 1;
        Ok(Self { events, next_id })
    }

    /// Verify a snapshot against the hash recorded on a stored event.
    ///
    /// Returns false when the event recorded no hash.
    pub fn verify_event_snapshot(&self, event_id: EventId, snapshot: &Value) -> bool {
        self.events
            .iter()
            .find(|e| e.id == event_id)
            .and_then(|e| e.content_hash.as_deref())
            .map(|expected| verify_hash(snapshot, expected))
            .unwrap_or(false)
    }
}
