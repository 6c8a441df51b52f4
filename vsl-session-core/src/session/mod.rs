mod fields;

pub use fields::{Field, SessionFields};

use crate::error::InvalidPayloadError;
use crate::grammar::SessionId;
use crate::registry::TagRuleRegistry;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Open,
    Closed,
}

/// Accumulator for every line that shares one session id.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    fields: SessionFields,
    raw_history: Vec<String>,
    state: SessionState,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            fields: SessionFields::default(),
            raw_history: Vec::new(),
            state: SessionState::Open,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn fields(&self) -> &SessionFields {
        &self.fields
    }

    pub fn raw_history(&self) -> &[String] {
        &self.raw_history
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    /// Record one line and run its tag rule.
    ///
    /// The line is appended to the raw history before the rule runs, so a
    /// failing rule still leaves its line in the history. Fields written
    /// before the failure are kept as they are.
    pub fn apply(
        &mut self,
        registry: &TagRuleRegistry,
        tag: &str,
        payload: &str,
    ) -> Result<(), InvalidPayloadError> {
        debug_assert!(!self.is_closed(), "session {} already closed", self.id);

        self.raw_history.push(format!("{tag} {payload}"));

        if let Some(rule) = registry.rule(tag) {
            rule.apply(&mut self.fields, payload)?;
        }

        if registry.is_closing(tag) {
            self.state = SessionState::Closed;
        }

        Ok(())
    }

    /// Consume a closed session into the record handed to sinks.
    pub fn finish(self) -> FinishedSession {
        FinishedSession {
            id: self.id,
            fields: self.fields,
            raw_history: self.raw_history,
        }
    }
}

/// A session that has seen its closing tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinishedSession {
    pub id: SessionId,
    pub fields: SessionFields,
    pub raw_history: Vec<String>,
}

impl FinishedSession {
    /// Raw history as newline-joined text.
    pub fn raw_text(&self) -> String {
        self.raw_history.join("\n")
    }
}
