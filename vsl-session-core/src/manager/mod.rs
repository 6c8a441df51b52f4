
use crate::error::InvalidPayloadError;
use crate::grammar::{RawLine, SessionId};
use crate::registry::TagRuleRegistry;
use crate::session::{FinishedSession, Session};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, trace};

/// Owns every live session and routes parsed lines to them.
///
/// Sessions are created on the first line carrying an unseen id and removed
/// at the instant their closing tag is applied. Sessions that never close
/// stay live for as long as the manager does.
pub struct SessionManager<'r> {
    registry: &'r TagRuleRegistry,
    live: HashMap<SessionId, Session>,
    archive: Option<Vec<FinishedSession>>,
}

impl<'r> SessionManager<'r> {
    pub fn new(registry: &'r TagRuleRegistry) -> Self {
        Self {
            registry,
            live: HashMap::new(),
            archive: None,
        }
    }

    /// Keep a copy of every finished session in addition to emitting it.
    pub fn retaining_finished(mut self) -> Self {
        self.archive = Some(Vec::new());
        self
    }

    /// Apply one line to its session.
    ///
    /// Returns the session when this line closed it. On error the session
    /// stays live as mutated up to the failing rule.
    pub fn route(&mut self, raw: RawLine) -> Result<Option<FinishedSession>, InvalidPayloadError> {
        let RawLine {
            session_id,
            tag,
            payload,
        } = raw;

        let mut slot = match self.live.entry(session_id) {
            Entry::Occupied(slot) => slot,
            Entry::Vacant(slot) => {
                debug!(session_id = session_id.0, "session opened");
                slot.insert_entry(Session::new(session_id))
            }
        };

        trace!(session_id = session_id.0, tag = %tag, "apply");
        slot.get_mut().apply(self.registry, &tag, &payload)?;

        if !slot.get().is_closed() {
            return Ok(None);
        }

        let finished = slot.remove().finish();
        debug!(
            session_id = session_id.0,
            lines = finished.raw_history.len(),
            "session closed"
        );

        if let Some(archive) = self.archive.as_mut() {
            archive.push(finished.clone());
        }

        Ok(Some(finished))
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, id: SessionId) -> bool {
        self.live.contains_key(&id)
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.live.get(&id)
    }

    /// Ids of sessions still waiting for their closing tag, ascending.
    pub fn open_sessions(&self) -> Vec<SessionId> {
        let mut ids: Vec<_> = self.live.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Finished sessions in closing order, when retention is enabled.
    pub fn finished(&self) -> Option<&[FinishedSession]> {
        self.archive.as_deref()
    }

    /// Drain the sessions that never closed, ascending by id.
    pub fn into_open_sessions(self) -> Vec<Session> {
        let mut sessions: Vec<_> = self.live.into_values().collect();
        sessions.sort_by_key(Session::id);
        sessions
    }
}
