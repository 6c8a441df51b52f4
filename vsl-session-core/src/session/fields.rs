use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Flat string fields a verbatim rule can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Ip,
    Method,
    Url,
    Protocol,
    Status,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Ip,
        Field::Method,
        Field::Url,
        Field::Protocol,
        Field::Status,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Ip => "ip",
            Field::Method => "method",
            Field::Url => "url",
            Field::Protocol => "protocol",
            Field::Status => "status",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Structured data reconstructed for one session.
///
/// A field is `None` until some tag writes it, so the serialized form only
/// carries keys that were actually seen in the log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
}

impl SessionFields {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Ip => &mut self.ip,
            Field::Method => &mut self.method,
            Field::Url => &mut self.url,
            Field::Protocol => &mut self.protocol,
            Field::Status => &mut self.status,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot(field) = Some(value.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Ip => self.ip.as_deref(),
            Field::Method => self.method.as_deref(),
            Field::Url => self.url.as_deref(),
            Field::Protocol => self.protocol.as_deref(),
            Field::Status => self.status.as_deref(),
        }
    }

    /// Insert or replace a header. Existing names keep their slot.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref()?.get(name).map(String::as_str)
    }

    /// Names of the keys written so far, in serialization order.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = Field::ALL
            .iter()
            .filter(|f| self.get(**f).is_some())
            .map(|f| f.name())
            .collect();

        if self.headers.is_some() {
            keys.push("headers");
        }

        keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }
}
