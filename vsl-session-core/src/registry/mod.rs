//! Tag name to extraction rule table.
//!
//! The table is fixed: it is built once, on first use, and shared read-only
//! by every session. Tags missing from the table still land in a session's
//! raw history but never touch its fields.

mod rules;

use crate::error::InvalidPayloadError;
use crate::session::{Field, SessionFields};
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const SESSION_OPEN: &str = "SessionOpen";
pub const SESSION_CLOSE: &str = "SessionClose";
pub const RX_HEADER: &str = "RxHeader";
pub const RX_PROTOCOL: &str = "RxProtocol";
pub const RX_URL: &str = "RxURL";
pub const RX_REQUEST: &str = "RxRequest";
pub const TX_STATUS: &str = "TxStatus";

/// Validates a payload and writes whatever it extracts.
pub type StructuredRule = fn(&mut SessionFields, &str) -> Result<(), InvalidPayloadError>;

#[derive(Clone, Copy)]
pub enum TagRule {
    Structured(StructuredRule),
    /// Store the payload unmodified.
    Verbatim(Field),
}

impl TagRule {
    pub fn apply(&self, fields: &mut SessionFields, payload: &str) -> Result<(), InvalidPayloadError> {
        match self {
            TagRule::Structured(rule) => rule(fields, payload),
            TagRule::Verbatim(field) => {
                fields.set(*field, payload);
                Ok(())
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TagRule::Structured(_) => "structured",
            TagRule::Verbatim(_) => "verbatim",
        }
    }
}

impl std::fmt::Debug for TagRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagRule::Structured(_) => f.write_str("Structured"),
            TagRule::Verbatim(field) => write!(f, "Verbatim({field})"),
        }
    }
}

fn builtin_rules() -> HashMap<&'static str, TagRule> {
    let mut map = HashMap::new();

    map.insert(SESSION_OPEN, TagRule::Structured(rules::session_open));
    map.insert(SESSION_CLOSE, TagRule::Structured(rules::session_close));
    map.insert(RX_HEADER, TagRule::Structured(rules::rx_header));

    map.insert(RX_PROTOCOL, TagRule::Verbatim(Field::Protocol));
    map.insert(RX_URL, TagRule::Verbatim(Field::Url));
    map.insert(RX_REQUEST, TagRule::Verbatim(Field::Method));
    map.insert(TX_STATUS, TagRule::Verbatim(Field::Status));

    map
}

static BUILTIN: Lazy<TagRuleRegistry> = Lazy::new(|| TagRuleRegistry {
    rules: builtin_rules(),
});

#[derive(Debug)]
pub struct TagRuleRegistry {
    rules: HashMap<&'static str, TagRule>,
}

impl TagRuleRegistry {
    /// The process-wide table of varnishlog tags this tool understands.
    pub fn builtin() -> &'static TagRuleRegistry {
        &BUILTIN
    }

    pub fn rule(&self, tag: &str) -> Option<&TagRule> {
        self.rules.get(tag)
    }

    /// Registered tags with their rules, sorted by tag name.
    pub fn tags(&self) -> Vec<(&'static str, &TagRule)> {
        let mut tags: Vec<_> = self.rules.iter().map(|(tag, rule)| (*tag, rule)).collect();
        tags.sort_by_key(|(tag, _)| *tag);
        tags
    }

    pub fn is_closing(&self, tag: &str) -> bool {
        tag == SESSION_CLOSE
    }
}
